use std::fs::File;
use std::io::Write;

use schemars::schema_for;
use xbox_to_switch::config::mapping::MappingConfig;

fn main() {
    let mapping_v1_schema = schema_for!(MappingConfig);
    let mut file = File::create("./rootfs/usr/share/xbox-to-switch/schema/mapping_v1.json")
        .expect("Failed to create schema file");
    write!(
        file,
        "{}",
        serde_json::to_string_pretty(&mapping_v1_schema).expect("Failed to serialize schema")
    )
    .expect("Failed to write schema");
}
