//! `std:platform`

use super::NativeModule;
use crate::value::Value;

pub(super) fn module() -> NativeModule {
    NativeModule::new("std:platform")
        .constant("os", Value::from(std::env::consts::OS))
        .constant("arch", Value::from(std::env::consts::ARCH))
        .constant("version", Value::from(env!("CARGO_PKG_VERSION")))
        .constant("runtime", Value::from("goose"))
}
