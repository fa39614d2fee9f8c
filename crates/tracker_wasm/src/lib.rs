pub mod app;
pub mod errors;

mod tracing;

use ::tracing::trace;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub fn init_panic_handler() {
    trace!("init panic handler");
    console_error_panic_hook::set_once();
}
