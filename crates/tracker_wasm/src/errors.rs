use wasm_bindgen::JsValue;

pub type Result<T, E = WasmError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
#[error("{msg}")]
pub struct WasmError {
    msg: String,
}

impl WasmError {
    pub fn new(msg: impl Into<String>) -> Self {
        WasmError { msg: msg.into() }
    }
}

impl From<reqwest::Error> for WasmError {
    fn from(value: reqwest::Error) -> Self {
        WasmError::new(format!("request failed: {value}"))
    }
}

impl From<serde_json::Error> for WasmError {
    fn from(value: serde_json::Error) -> Self {
        WasmError::new(format!("invalid response: {value}"))
    }
}

impl From<url::ParseError> for WasmError {
    fn from(value: url::ParseError) -> Self {
        WasmError::new(format!("invalid url: {value}"))
    }
}

/// Errors coming out of DOM calls.
impl From<JsValue> for WasmError {
    fn from(value: JsValue) -> Self {
        match value.as_string() {
            Some(s) => WasmError::new(s),
            None => WasmError::new(format!("{value:?}")),
        }
    }
}

impl From<WasmError> for JsValue {
    fn from(value: WasmError) -> Self {
        js_sys::Error::new(&value.msg).into()
    }
}
