#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::Value;
use sheaf_codec::RowNester;

fuzz_target!(|paths: Vec<String>| {
    let Ok(nester) = RowNester::from_dotted(&paths) else {
        return;
    };
    let values: Vec<Value> = (0..paths.len()).map(|i| Value::from(i as u64)).collect();
    let _ = nester.nest(values);
});
