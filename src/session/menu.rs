//! Navigation menu normalization.
//!
//! The backend returns raw menu entries (`id`, `code`, `nom`, `icone`,
//! `route`, `children`); screens consume the presentation-ready `MenuItem`
//! tree. Icon names arrive in Google Material form and are translated to the
//! FontAwesome set through a fixed lookup table, with `fa-circle` as the
//! fallback for anything unmapped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const FALLBACK_ICON: &str = "fa-circle";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default)]
    pub children: Vec<MenuItem>,
}

// Material icon name -> FontAwesome class. Only mappings observed in the
// backend's menu data; unmapped names fall back to FALLBACK_ICON.
const MATERIAL_TO_FONTAWESOME: &[(&str, &str)] = &[
    // Dashboard & general
    ("dashboard", "fa-gauge-high"),
    ("bar_chart", "fa-chart-bar"),
    ("trending_up", "fa-chart-line"),
    ("assessment", "fa-chart-pie"),
    ("info", "fa-info-circle"),
    ("help", "fa-question-circle"),
    // Patients & records
    ("people", "fa-users"),
    ("person", "fa-user"),
    ("group", "fa-people-group"),
    ("person_add", "fa-user-plus"),
    ("folder_open", "fa-folder-open"),
    ("folder_medical", "fa-folder"),
    ("description", "fa-file-alt"),
    ("description_alt", "fa-file-alt"),
    // Lists & actions
    ("list", "fa-list"),
    ("list_alt", "fa-list"),
    ("table_chart", "fa-table"),
    ("add", "fa-plus"),
    ("add_circle", "fa-plus-circle"),
    ("edit", "fa-edit"),
    ("delete", "fa-trash"),
    ("download", "fa-download"),
    ("upload", "fa-upload"),
    ("print", "fa-print"),
    ("search", "fa-search"),
    ("filter_list", "fa-filter"),
    ("sort", "fa-sort"),
    ("refresh", "fa-sync"),
    // Medical
    ("medical_services", "fa-stethoscope"),
    ("local_hospital", "fa-hospital"),
    ("local_pharmacy", "fa-pills"),
    ("science", "fa-flask"),
    ("bloodtype", "fa-droplet"),
    ("health_and_safety", "fa-shield-heart"),
    ("request_page", "fa-file-contract"),
    ("report_problem", "fa-exclamation-triangle"),
    ("warning", "fa-exclamation-triangle"),
    ("error", "fa-times-circle"),
    ("check_circle", "fa-check-circle"),
    ("priority_high", "fa-exclamation-circle"),
    // Calendar & dates
    ("event", "fa-calendar"),
    ("calendar_today", "fa-calendar-day"),
    ("calendar_month", "fa-calendar"),
    ("schedule", "fa-clock"),
    ("access_time", "fa-hourglass-half"),
    ("date_range", "fa-calendar-alt"),
    // Management & administration
    ("admin_panel_settings", "fa-cog"),
    ("settings", "fa-sliders-h"),
    ("security", "fa-lock"),
    ("history", "fa-history"),
    ("backup", "fa-database"),
    ("archive", "fa-box-archive"),
    ("build", "fa-hammer"),
    ("devices", "fa-microchip"),
    ("bed", "fa-bed"),
    ("business", "fa-building"),
    ("domain", "fa-project-diagram"),
    // Logistics & stock
    ("inventory", "fa-boxes"),
    ("local_shipping", "fa-truck"),
    ("shopping_cart", "fa-shopping-cart"),
    ("receipt", "fa-receipt"),
    ("payment", "fa-credit-card"),
    ("attach_money", "fa-money-bill"),
    // Communication & notifications
    ("mail", "fa-envelope"),
    ("notifications", "fa-bell"),
    ("message", "fa-comments"),
    ("chat", "fa-comments"),
    // Other
    ("school", "fa-graduation-cap"),
    ("beach_access", "fa-umbrella-beach"),
    ("emergency", "fa-ambulance"),
    ("exit_to_app", "fa-sign-out-alt"),
    ("compare_arrows", "fa-exchange-alt"),
    ("image", "fa-image"),
    ("image_search", "fa-search-plus"),
    ("prescription", "fa-prescription-bottle"),
    ("medication", "fa-pills"),
];

fn translate(material: &str) -> Option<&'static str> {
    MATERIAL_TO_FONTAWESOME
        .iter()
        .find(|(name, _)| *name == material)
        .map(|(_, fa)| *fa)
}

fn icon_from_code(code: &str) -> Option<&'static str> {
    let code = code.to_lowercase();
    MATERIAL_TO_FONTAWESOME
        .iter()
        .find(|(name, _)| code.contains(name))
        .map(|(_, fa)| *fa)
}

/// Icon selection: prefer the backend-provided icon (passed through when
/// already a `fa-` class, translated when Material), then a substring match
/// on the entry code, then the fallback.
fn icon_for(icone: Option<&str>, code: &str) -> String {
    if let Some(raw) = icone.filter(|s| !s.trim().is_empty()) {
        let name = raw.trim().to_lowercase();
        if name.starts_with("fa-") {
            return name;
        }
        if let Some(fa) = translate(&name) {
            return fa.to_string();
        }
        if let Some(fa) = icon_from_code(code) {
            return fa.to_string();
        }
    } else if let Some(fa) = icon_from_code(code) {
        return fa.to_string();
    }

    FALLBACK_ICON.to_string()
}

/// Normalize one raw API entry, recursing into children.
#[must_use]
pub fn map_api_menu_item(api: &Value) -> MenuItem {
    let code = api["code"].as_str().unwrap_or("");
    let label = api["nom"]
        .as_str()
        .filter(|s| !s.is_empty())
        .unwrap_or(code)
        .to_string();

    let id = match &api["id"] {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => String::new(),
    };

    MenuItem {
        id,
        label,
        icon: icon_for(api["icone"].as_str(), code),
        path: api["route"].as_str().map(str::to_string),
        children: api["children"]
            .as_array()
            .map(|children| children.iter().map(map_api_menu_item).collect())
            .unwrap_or_default(),
    }
}

/// Normalize a raw menu list; anything that is not an array yields no menus
/// rather than an error.
#[must_use]
pub fn map_api_menus(menus: &Value) -> Vec<MenuItem> {
    menus
        .as_array()
        .map(|items| items.iter().map(map_api_menu_item).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_material_icon_names() {
        let item = map_api_menu_item(&json!({
            "id": 3,
            "code": "patients",
            "nom": "Patients",
            "icone": "people",
            "route": "/patients"
        }));

        assert_eq!(item.id, "3");
        assert_eq!(item.label, "Patients");
        assert_eq!(item.icon, "fa-users");
        assert_eq!(item.path.as_deref(), Some("/patients"));
        assert!(item.children.is_empty());
    }

    #[test]
    fn passes_fontawesome_icons_through() {
        let item = map_api_menu_item(&json!({
            "id": 1,
            "code": "rh",
            "nom": "RH",
            "icone": "FA-User-Md"
        }));
        assert_eq!(item.icon, "fa-user-md");
    }

    #[test]
    fn falls_back_to_code_substring_then_default() {
        let from_code = map_api_menu_item(&json!({
            "id": 2,
            "code": "dashboard_main",
            "nom": "Tableau de bord"
        }));
        assert_eq!(from_code.icon, "fa-gauge-high");

        let unmapped = map_api_menu_item(&json!({
            "id": 4,
            "code": "zzz",
            "nom": "Divers",
            "icone": "no_such_icon"
        }));
        assert_eq!(unmapped.icon, FALLBACK_ICON);
    }

    #[test]
    fn label_falls_back_to_code() {
        let item = map_api_menu_item(&json!({ "id": 5, "code": "lits" }));
        assert_eq!(item.label, "lits");
    }

    #[test]
    fn maps_children_recursively() {
        let item = map_api_menu_item(&json!({
            "id": 10,
            "code": "parametres",
            "nom": "Paramètres",
            "icone": "settings",
            "children": [
                { "id": 11, "code": "lits", "nom": "Lits", "icone": "bed" },
                { "id": 12, "code": "chambres", "nom": "Chambres" }
            ]
        }));

        assert_eq!(item.children.len(), 2);
        assert_eq!(item.children[0].icon, "fa-bed");
        assert_eq!(item.children[0].id, "11");
    }

    #[test]
    fn non_array_menus_yield_empty() {
        assert!(map_api_menus(&json!(null)).is_empty());
        assert!(map_api_menus(&json!({"unexpected": true})).is_empty());
        assert_eq!(map_api_menus(&json!([{ "id": 1, "code": "x" }])).len(), 1);
    }
}
