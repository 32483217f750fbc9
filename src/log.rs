//! Browser console logging.
//!
//! Calls into `web_sys::console` are only valid on wasm32; native test
//! builds compile these to no-ops.

const PREFIX: &str = "[grow-island]";

#[cfg(target_arch = "wasm32")]
pub fn info(msg: &str) {
    web_sys::console::log_1(&format!("{PREFIX} {msg}").into());
}

#[cfg(target_arch = "wasm32")]
pub fn warn(msg: &str) {
    web_sys::console::warn_1(&format!("{PREFIX} {msg}").into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn info(msg: &str) {
    let _ = (PREFIX, msg);
}

#[cfg(not(target_arch = "wasm32"))]
pub fn warn(msg: &str) {
    let _ = (PREFIX, msg);
}
