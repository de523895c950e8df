//! Binary codec for the cube's line protocol.
//!
//! Every line is `<tag>:<payload>`. Inbound tags:
//!
//! | Tag | Message | Payload |
//! |-----|---------|---------|
//! | `H` | Hello | comma-separated text |
//! | `M` | Metadata | base64 blob in field 2 |
//! | `C` | Device configuration | base64 blob in field 1 |
//! | `L` | Device list | whole payload is base64 |
//! | `S` | Command acknowledgment | comma-separated text |
//!
//! Outbound lines are `l:` (list request), `s:<base64>` (set temperature)
//! and `r:01,<base64>` (reset error).

pub mod decode;
pub mod encode;

pub use decode::{
    parse_device_config, parse_device_list, parse_hello, parse_metadata, parse_send_ack,
};
pub use encode::{LIST_REQUEST, encode_temperature, reset_error_line, set_temperature_line};

/// Line terminator used in both directions.
pub const LINE_DELIMITER: &str = "\r\n";
