pub mod common;

mod dispatch_fan_out;
