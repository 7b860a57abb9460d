//! Performs controller side effects with browser primitives.

use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use crate::controller::SideEffect;

/// Carries out a side effect. Failures are logged, never raised.
pub fn perform(effect: SideEffect) {
	match effect {
		SideEffect::Download {
			filename,
			mime,
			bytes,
		} => match download(filename, mime, &bytes) {
			Ok(()) => info!("downloaded {filename} ({} bytes)", bytes.len()),
			Err(err) => error!("download of {filename} failed: {err:?}"),
		},
		SideEffect::Notice(message) => alert(&message),
		SideEffect::Failure(message) => alert(&format!("操作失败: {message}")),
	}
}

fn download(filename: &str, mime: &str, bytes: &[u8]) -> Result<(), JsValue> {
	let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
	let document = window
		.document()
		.ok_or_else(|| JsValue::from_str("no document"))?;

	let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
	let options = BlobPropertyBag::new();
	options.set_type(mime);
	let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
	let url = Url::create_object_url_with_blob(&blob)?;

	let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
	anchor.set_href(&url);
	anchor.set_download(filename);
	anchor.click();
	Url::revoke_object_url(&url)
}

fn alert(message: &str) {
	if let Some(window) = web_sys::window() {
		let _ = window.alert_with_message(message);
	}
}
