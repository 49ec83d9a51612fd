//! Embedded static resources for the dev server.
//!
//! ```ignore
//! use embed::serve::{HOTRELOAD_JS, HotreloadVars};
//!
//! let js = HOTRELOAD_JS.render(&HotreloadVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL path the client script is served from.
    pub const HOTRELOAD_PATH: &str = "/__wasmserve/hotreload.js";

    /// Variables for hotreload.js.
    pub struct HotreloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for HotreloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Live reload client: reloads on `reload`, shows an overlay on `error`.
    pub const HOTRELOAD_JS: Template<HotreloadVars> =
        Template::new(include_str!("serve/hotreload.js"));

    /// Variables for building.html.
    pub struct BuildingVars<'a> {
        pub mode: &'a str,
    }

    impl TemplateVars for BuildingVars<'_> {
        fn apply(&self, content: &str) -> String {
            content.replace("__MODE__", self.mode)
        }
    }

    /// Page served until the first bundle lands; polls and reloads itself.
    pub const BUILDING_HTML: Template<BuildingVars<'static>> =
        Template::new(include_str!("serve/building.html"));

    /// `<script>` tag injected into served HTML.
    pub fn hotreload_tag() -> String {
        format!(r#"<script src="{HOTRELOAD_PATH}"></script>"#)
    }
}

#[cfg(test)]
mod tests {
    use super::serve::*;

    #[test]
    fn test_hotreload_port_substituted() {
        let js = HOTRELOAD_JS.render(&HotreloadVars { ws_port: 35730 });
        assert!(js.contains("35730"));
        assert!(!js.contains("__WS_PORT__"));
    }

    #[test]
    fn test_building_page() {
        let html = BUILDING_HTML.render(&BuildingVars { mode: "development" });
        assert!(html.contains("development"));
        assert!(!html.contains("__MODE__"));
    }

    #[test]
    fn test_hotreload_tag() {
        assert_eq!(
            hotreload_tag(),
            r#"<script src="/__wasmserve/hotreload.js"></script>"#
        );
    }
}
