//! Page model: element registry, meta tags and feature capabilities
//!
//! The console never probes for elements after start-up. A [`PageLayout`]
//! lists what the page contains, and [`Capabilities`] is derived from it once
//! at initialization.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::ConsoleError;

/// Name of the meta tag carrying the CSRF token
pub const CSRF_META_NAME: &str = "csrf-token";

/// Element identifiers the console knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElementId {
    #[serde(rename = "prom-status")]
    PromStatus,
    #[serde(rename = "graf-status")]
    GrafStatus,
    #[serde(rename = "btn-provision")]
    BtnProvision,
    #[serde(rename = "provision-result")]
    ProvisionResult,
    #[serde(rename = "toast")]
    Toast,
    #[serde(rename = "btn-graf-info")]
    BtnGrafInfo,
    #[serde(rename = "graf-info")]
    GrafInfo,
    #[serde(rename = "cpu")]
    Cpu,
    #[serde(rename = "memory")]
    Memory,
    #[serde(rename = "disk")]
    Disk,
    #[serde(rename = "btn-alert-save-ajax")]
    BtnAlertSaveAjax,
    #[serde(rename = "ajax-alert-out")]
    AjaxAlertOut,
    #[serde(rename = "btn-back")]
    BtnBack,
}

impl ElementId {
    /// Every known element, in page order
    pub const ALL: [ElementId; 13] = [
        ElementId::PromStatus,
        ElementId::GrafStatus,
        ElementId::BtnProvision,
        ElementId::ProvisionResult,
        ElementId::Toast,
        ElementId::BtnGrafInfo,
        ElementId::GrafInfo,
        ElementId::Cpu,
        ElementId::Memory,
        ElementId::Disk,
        ElementId::BtnAlertSaveAjax,
        ElementId::AjaxAlertOut,
        ElementId::BtnBack,
    ];

    /// The DOM id of this element
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementId::PromStatus => "prom-status",
            ElementId::GrafStatus => "graf-status",
            ElementId::BtnProvision => "btn-provision",
            ElementId::ProvisionResult => "provision-result",
            ElementId::Toast => "toast",
            ElementId::BtnGrafInfo => "btn-graf-info",
            ElementId::GrafInfo => "graf-info",
            ElementId::Cpu => "cpu",
            ElementId::Memory => "memory",
            ElementId::Disk => "disk",
            ElementId::BtnAlertSaveAjax => "btn-alert-save-ajax",
            ElementId::AjaxAlertOut => "ajax-alert-out",
            ElementId::BtnBack => "btn-back",
        }
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ElementId {
    type Err = ConsoleError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let id = s.trim().trim_start_matches('#');
        ElementId::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == id)
            .ok_or_else(|| ConsoleError::InvalidElement(s.to_string()))
    }
}

/// Page-level `<meta name=... content=...>` tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    tags: HashMap<String, String>,
}

impl PageMeta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Meta tags with only a CSRF token
    pub fn with_csrf_token<S: Into<String>>(token: S) -> Self {
        let mut meta = Self::new();
        meta.set(CSRF_META_NAME, token);
        meta
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, name: K, content: V) {
        self.tags.insert(name.into(), content.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }

    /// The CSRF token, if the tag exists and is non-empty
    pub fn csrf_token(&self) -> Option<&str> {
        self.get(CSRF_META_NAME).filter(|token| !token.is_empty())
    }
}

/// Elements present on the page with their initial text (labels) or value (inputs)
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub meta: PageMeta,
    elements: BTreeMap<ElementId, String>,
}

impl PageLayout {
    /// An empty page: no elements, no meta tags
    pub fn new(meta: PageMeta) -> Self {
        Self {
            meta,
            elements: BTreeMap::new(),
        }
    }

    /// The admin home page with every element the console drives
    pub fn admin_home(meta: PageMeta) -> Self {
        let mut layout = Self::new(meta);
        for (id, text) in default_admin_elements() {
            layout.insert(id, text);
        }
        layout
    }

    /// Add an element (or replace its initial text)
    pub fn insert<S: Into<String>>(&mut self, id: ElementId, text: S) {
        self.elements.insert(id, text.into());
    }

    /// Builder-style [`PageLayout::insert`]
    pub fn with<S: Into<String>>(mut self, id: ElementId, text: S) -> Self {
        self.insert(id, text);
        self
    }

    pub fn remove(&mut self, id: ElementId) -> Option<String> {
        self.elements.remove(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Initial text or value of an element, `None` when the element is absent
    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.elements.get(&id).map(String::as_str)
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::detect(self)
    }
}

/// Initial content of the admin home page
pub fn default_admin_elements() -> BTreeMap<ElementId, String> {
    [
        (ElementId::PromStatus, "…"),
        (ElementId::GrafStatus, "…"),
        (ElementId::BtnProvision, "Provision Grafana dashboard"),
        (ElementId::ProvisionResult, ""),
        (ElementId::Toast, ""),
        (ElementId::BtnGrafInfo, "Grafana info"),
        (ElementId::GrafInfo, ""),
        (ElementId::Cpu, "80"),
        (ElementId::Memory, "80"),
        (ElementId::Disk, "80"),
        (ElementId::BtnAlertSaveAjax, "Save thresholds"),
        (ElementId::AjaxAlertOut, ""),
        (ElementId::BtnBack, "Back"),
    ]
    .into_iter()
    .map(|(id, text)| (id, text.to_string()))
    .collect()
}

/// Which features the page can activate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    /// Both status indicators exist
    pub status: bool,
    /// Provision button exists (result panel and toast are optional)
    pub provision: bool,
    /// Info button and info panel exist
    pub info: bool,
    /// Save button and inline output exist (inputs are optional)
    pub alert_form: bool,
    pub back: bool,
}

impl Capabilities {
    pub fn detect(layout: &PageLayout) -> Self {
        Self {
            status: layout.contains(ElementId::PromStatus) && layout.contains(ElementId::GrafStatus),
            provision: layout.contains(ElementId::BtnProvision),
            info: layout.contains(ElementId::BtnGrafInfo) && layout.contains(ElementId::GrafInfo),
            alert_form: layout.contains(ElementId::BtnAlertSaveAjax)
                && layout.contains(ElementId::AjaxAlertOut),
            back: layout.contains(ElementId::BtnBack),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_id_round_trip_names() {
        for id in ElementId::ALL {
            assert_eq!(id.as_str().parse::<ElementId>().unwrap(), id);
        }
        assert_eq!("#btn-back".parse::<ElementId>().unwrap(), ElementId::BtnBack);
        assert!("btn-missing".parse::<ElementId>().is_err());
    }

    #[test]
    fn test_csrf_token_empty_is_absent() {
        assert_eq!(PageMeta::new().csrf_token(), None);
        assert_eq!(PageMeta::with_csrf_token("").csrf_token(), None);
        assert_eq!(PageMeta::with_csrf_token("abc").csrf_token(), Some("abc"));
    }

    #[test]
    fn test_capabilities_follow_elements() {
        let full = PageLayout::admin_home(PageMeta::new()).capabilities();
        assert!(full.status && full.provision && full.info && full.alert_form && full.back);

        let mut layout = PageLayout::admin_home(PageMeta::new());
        layout.remove(ElementId::GrafStatus);
        layout.remove(ElementId::GrafInfo);
        layout.remove(ElementId::ProvisionResult);
        let caps = layout.capabilities();
        assert!(!caps.status);
        assert!(!caps.info);
        assert!(caps.provision);

        assert_eq!(PageLayout::new(PageMeta::new()).capabilities(), Capabilities::default());
    }
}
