//! Standalone Leaflet page for a [`MapView`].

use std::fmt;
use std::path::Path;

use exn::ResultExt;

use super::MapView;

const VIEW_PLACEHOLDER: &str = "__MAP_VIEW__";

const PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>JagAI - Medical Drone Delivery</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.css" crossorigin="anonymous" />
  <script src="https://cdnjs.cloudflare.com/ajax/libs/leaflet/1.9.4/leaflet.js" crossorigin="anonymous"></script>
  <style>
    html, body, #map { height: 100%; margin: 0; }
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    const view = __MAP_VIEW__;
    const map = L.map('map', { scrollWheelZoom: view.scroll_wheel_zoom })
      .setView([view.center.latitude, view.center.longitude], view.zoom);
    L.tileLayer(view.tiles.url, { attribution: view.tiles.attribution }).addTo(map);
    for (const marker of view.markers) {
      const icon = L.icon({
        iconUrl: marker.icon.url,
        iconSize: marker.icon.size,
        iconAnchor: marker.icon.anchor,
      });
      const popup = document.createElement('span');
      popup.textContent = marker.popup;
      L.marker([marker.position.latitude, marker.position.longitude], { icon })
        .bindPopup(popup)
        .addTo(map);
    }
  </script>
</body>
</html>
"#;

#[derive(Debug)]
pub struct Error(String);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Error {}

/// Render the page. The view is embedded as a JSON literal.
pub fn render(view: &MapView) -> exn::Result<String, Error> {
    let json = serde_json::to_string(view).or_raise(|| Error("serialize map view".into()))?;
    // No raw '<' inside the script element: "</script>" and "<!--" in a
    // popup must not change how the HTML parser reads it.
    let json = json.replace('<', "\\u003c");
    Ok(PAGE.replace(VIEW_PLACEHOLDER, &json))
}

/// Render the page and write it to `path`.
pub fn write(path: &Path, view: &MapView) -> exn::Result<(), Error> {
    let page = render(view)?;
    std::fs::write(path, page).or_raise(|| Error(format!("write map {}", path.display())))?;
    tracing::debug!(path = %path.display(), "map written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::Facility;
    use crate::map::{present, MapConfig};
    use jagai_geo::Coordinate;

    #[test]
    fn embeds_view() {
        let facility = Facility {
            name: "St. Rose Hospital".to_owned(),
            position: Coordinate::new(36.1, -115.1),
        };
        let view = present(
            Some(Coordinate::new(36.2, -115.2)),
            Some(&facility),
            &MapConfig::default(),
        );
        let page = render(&view).unwrap();
        assert!(!page.contains(VIEW_PLACEHOLDER));
        assert!(page.contains(r#""center":{"latitude":36.2,"longitude":-115.2}"#));
        assert!(page.contains(r#""zoom":11"#));
        assert!(page.contains("You are here"));
        assert!(page.contains("St. Rose Hospital"));
    }

    #[test]
    fn escapes_closing_tags() {
        let facility = Facility {
            name: "</script><b>x</b>".to_owned(),
            position: Coordinate::new(0.0, 0.0),
        };
        let view = present(None, Some(&facility), &MapConfig::default());
        let page = render(&view).unwrap();
        assert_eq!(page.matches("</script>").count(), 2);
        assert!(page.contains("\\u003c/script>\\u003cb>x\\u003c/b>"));
    }

    #[test]
    fn escapes_comment_openers() {
        let facility = Facility {
            name: "<!--<script>".to_owned(),
            position: Coordinate::new(0.0, 0.0),
        };
        let view = present(None, Some(&facility), &MapConfig::default());
        let page = render(&view).unwrap();
        assert!(!page.contains("<!--"));
        assert_eq!(page.matches("<script").count(), 2);
        assert!(page.contains("\\u003c!--\\u003cscript>"));
    }

    #[test]
    fn writes_file() {
        let path = std::env::temp_dir().join(format!("jagai-map-{}.html", std::process::id()));
        let view = present(None, None, &MapConfig::default());
        write(&path, &view).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert!(written.contains("L.tileLayer"));
    }
}
