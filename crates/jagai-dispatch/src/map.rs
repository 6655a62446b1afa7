//! Map presentation: a pure function of the user position and facility.

pub mod html;

use std::fmt::Write as _;

use jagai_geo::{percent_encode, Coordinate};

use crate::facility::Facility;

/// Map centre when no user position is known (Las Vegas).
pub const FALLBACK_CENTER: Coordinate = Coordinate::new(36.1699, -115.1398);
pub const DEFAULT_ZOOM: u8 = 11;
pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_ATTRIBUTION: &str =
    r#"&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors"#;
pub const USER_POPUP: &str = "You are here";

const USER_ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="32" height="32" viewBox="0 0 24 24" fill="none"><circle cx="12" cy="12" r="7" fill="#ffa4b9"/><circle cx="12" cy="12" r="3" fill="#ffffff"/></svg>"##;
const HOSPITAL_ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="32" height="32" viewBox="0 0 24 24" fill="none"><rect x="3" y="3" width="18" height="18" rx="4" fill="#ffffff" stroke="#ea4168" stroke-width="2"/><rect x="10" y="6" width="4" height="12" fill="#ea4168"/><rect x="6" y="10" width="12" height="4" fill="#ea4168"/></svg>"##;

/// Settings that shape every rendered map.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub fallback_center: Coordinate,
    pub zoom: u8,
    pub tile_url: String,
    pub attribution: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            fallback_center: FALLBACK_CENTER,
            zoom: DEFAULT_ZOOM,
            tile_url: DEFAULT_TILE_URL.to_owned(),
            attribution: DEFAULT_ATTRIBUTION.to_owned(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    User,
    Facility,
}

impl MarkerKind {
    const fn svg(self) -> &'static str {
        match self {
            Self::User => USER_ICON_SVG,
            Self::Facility => HOSPITAL_ICON_SVG,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Icon {
    pub url: String,
    pub size: [u16; 2],
    pub anchor: [u16; 2],
}

impl Icon {
    fn for_kind(kind: MarkerKind) -> Self {
        Self {
            url: format!("data:image/svg+xml;utf8,{}", percent_encode(kind.svg())),
            size: [32, 32],
            anchor: [16, 16],
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: Coordinate,
    pub icon: Icon,
    pub popup: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TileLayer {
    pub url: String,
    pub attribution: String,
}

/// Everything a tile surface needs to draw the map.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MapView {
    pub center: Coordinate,
    pub zoom: u8,
    pub scroll_wheel_zoom: bool,
    pub tiles: TileLayer,
    pub markers: Vec<Marker>,
}

impl MapView {
    #[must_use]
    pub fn marker(&self, kind: MarkerKind) -> Option<&Marker> {
        self.markers.iter().find(|m| m.kind == kind)
    }
}

/// Build the view for the current state. Centres on the user when known,
/// else on the fallback centre.
#[must_use]
pub fn present(
    user: Option<Coordinate>,
    facility: Option<&Facility>,
    config: &MapConfig,
) -> MapView {
    let mut markers = Vec::with_capacity(2);
    if let Some(position) = user {
        markers.push(Marker {
            kind: MarkerKind::User,
            position,
            icon: Icon::for_kind(MarkerKind::User),
            popup: USER_POPUP.to_owned(),
        });
    }
    if let Some(facility) = facility {
        markers.push(Marker {
            kind: MarkerKind::Facility,
            position: facility.position,
            icon: Icon::for_kind(MarkerKind::Facility),
            popup: facility.name.clone(),
        });
    }

    MapView {
        center: user.unwrap_or(config.fallback_center),
        zoom: config.zoom,
        scroll_wheel_zoom: true,
        tiles: TileLayer {
            url: config.tile_url.clone(),
            attribution: config.attribution.clone(),
        },
        markers,
    }
}

/// One-line description for the terminal.
#[must_use]
pub fn summary(view: &MapView) -> String {
    let mut out = format!("map centred on {} (zoom {})", view.center, view.zoom);
    if view.marker(MarkerKind::User).is_none() {
        out.push_str(", position unknown");
    }
    for marker in &view.markers {
        match marker.kind {
            MarkerKind::User => {
                let _ = write!(out, ", you: {}", marker.position);
            }
            MarkerKind::Facility => {
                let _ = write!(out, ", facility: {} at {}", marker.popup, marker.position);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hospital() -> Facility {
        Facility {
            name: "General Hospital".to_owned(),
            position: Coordinate::new(40.01, -75.01),
        }
    }

    #[test]
    fn no_position_uses_fallback() {
        let view = present(None, None, &MapConfig::default());
        assert_eq!(view.center, Coordinate::new(36.1699, -115.1398));
        assert!(view.markers.is_empty());
        assert_eq!(view.zoom, 11);
    }

    #[test]
    fn centres_on_user() {
        let user = Coordinate::new(40.0, -75.0);
        let view = present(Some(user), None, &MapConfig::default());
        assert_eq!(view.center, user);
        let marker = view.marker(MarkerKind::User).unwrap();
        assert_eq!(marker.popup, "You are here");
        assert_eq!(marker.position, user);
    }

    #[test]
    fn facility_without_user() {
        let view = present(None, Some(&hospital()), &MapConfig::default());
        assert_eq!(view.center, FALLBACK_CENTER);
        assert_eq!(view.markers.len(), 1);
        assert_eq!(view.markers[0].popup, "General Hospital");
    }

    #[test]
    fn both_markers() {
        let view = present(
            Some(Coordinate::new(40.0, -75.0)),
            Some(&hospital()),
            &MapConfig::default(),
        );
        assert_eq!(view.markers.len(), 2);
        assert!(view.marker(MarkerKind::Facility).is_some());
    }

    #[test]
    fn icons_are_svg_data_uris() {
        let icon = Icon::for_kind(MarkerKind::Facility);
        assert!(icon.url.starts_with("data:image/svg+xml;utf8,%3Csvg"));
        assert!(icon.url.contains("%23ea4168"));
        assert_eq!(icon.anchor, [16, 16]);
    }

    #[test]
    fn summary_mentions_markers() {
        let view = present(None, Some(&hospital()), &MapConfig::default());
        let text = summary(&view);
        assert!(text.contains("position unknown"));
        assert!(text.contains("General Hospital"));
    }
}
