//! JavaScript entry point.
//!
//! The host's module shim forwards its lifecycle hooks here:
//!
//! ```js
//! const birthday = new BirthdayModule(this.config);
//! // getDom:               birthday.dom()
//! // ALL_MODULES_STARTED:  birthday.start()
//! // suspend / resume:     birthday.suspend() / birthday.resume()
//! ```

use std::sync::Once;

use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

use crate::celebration::{Celebration, Config};
use crate::platform::web::{self, CONTAINER_CLASS, CONTAINER_ID};

static LOGGER: Once = Once::new();

fn init_logging(debug: bool) {
    LOGGER.call_once(|| {
        let level = if debug {
            log::Level::Debug
        } else {
            log::Level::Warn
        };
        wasm_logger::init(wasm_logger::Config::new(level));
    });
}

#[wasm_bindgen]
pub struct BirthdayModule {
    celebration: Celebration,
}

#[wasm_bindgen]
impl BirthdayModule {
    /// Build from the host's config object. `undefined` and `null` give
    /// the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<BirthdayModule, JsValue> {
        let config: Config = if config.is_undefined() || config.is_null() {
            Config::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        init_logging(config.debug);
        log::info!("[Birthday] Module initializing, style {}", config.firework_style);
        let platform = web::platform()?;
        Ok(BirthdayModule {
            celebration: Celebration::new(config, platform),
        })
    }

    /// The module's own element, where the message is shown.
    pub fn dom(&self) -> Result<HtmlElement, JsValue> {
        let document = web::window()?
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let wrapper = document.create_element("div")?.dyn_into::<HtmlElement>()?;
        wrapper.set_class_name(CONTAINER_CLASS);
        wrapper.set_id(CONTAINER_ID);
        wrapper.style().set_property("background", "none")?;
        Ok(wrapper)
    }

    /// All host modules are up; begin checking for birthdays.
    pub fn start(&self) {
        self.celebration.start();
    }

    pub fn suspend(&self) {
        self.celebration.suspend();
    }

    pub fn resume(&self) {
        self.celebration.resume();
    }

    pub fn stop(&self) {
        self.celebration.stop();
    }

    /// Run a check now. `force` restarts a running celebration.
    pub fn check(&self, force: bool) -> bool {
        self.celebration.check(force)
    }

    #[wasm_bindgen(getter)]
    pub fn celebrant(&self) -> Option<String> {
        self.celebration.celebrant()
    }
}
