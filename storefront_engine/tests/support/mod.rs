#![allow(dead_code)]
pub mod fake_processor;
pub mod prepare_env;
