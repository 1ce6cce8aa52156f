//! Simulation scenario files.
//!
//! A scenario describes a page, the images on it, and a scroll sequence:
//!
//! ```ini
//! [page]
//! viewport_height = 800
//! placeholder = blur.jpg
//!
//! [scroll]
//! offsets = 0, 200, 1200
//!
//! [image.hero]
//! src = https://cdn.example.com/hero.jpg
//! top = 900
//! height = 100
//!
//! [image.banner]
//! src = https://cdn.example.com/banner.jpg
//! top = 1500
//! height = 300
//! kind = div
//! fail = true
//! ```
//!
//! Images are kept in file order.

use std::path::Path;

use ini::{Ini, Properties};
use lazyimg::host::ElementKind;

use crate::error::CliError;

const IMAGE_SECTION_PREFIX: &str = "image.";

/// One image element on the simulated page.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioImage {
    /// Section name after `image.`.
    pub name: String,
    /// Real resource URL; absent means the element has no source.
    pub src: Option<String>,
    /// Document-space top edge.
    pub top: f64,
    /// Element height.
    pub height: f64,
    /// Element kind, `img` unless overridden.
    pub kind: ElementKind,
    /// Whether the offline loader should fail this image.
    pub fail: bool,
}

/// A parsed scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub viewport_height: f64,
    pub placeholder: Option<String>,
    pub offsets: Vec<f64>,
    pub images: Vec<ScenarioImage>,
}

impl Scenario {
    /// Read and parse a scenario file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let ini = Ini::load_from_file(path).map_err(|e| {
            CliError::Scenario(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_ini(&ini)
    }

    /// Parse scenario text.
    pub fn parse(text: &str) -> Result<Self, CliError> {
        let ini = Ini::load_from_str(text).map_err(|e| CliError::Scenario(e.to_string()))?;
        Self::from_ini(&ini)
    }

    /// Sources marked `fail = true`.
    pub fn failing_sources(&self) -> impl Iterator<Item = &str> {
        self.images
            .iter()
            .filter(|image| image.fail)
            .filter_map(|image| image.src.as_deref())
    }

    fn from_ini(ini: &Ini) -> Result<Self, CliError> {
        let page = ini
            .section(Some("page"))
            .ok_or_else(|| CliError::Scenario("missing [page] section".to_string()))?;
        let viewport_height = required_number(page, "page", "viewport_height")?;
        if viewport_height <= 0.0 {
            return Err(CliError::Scenario(
                "[page] viewport_height must be positive".to_string(),
            ));
        }
        let placeholder = page
            .get("placeholder")
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        let offsets = match ini.section(Some("scroll")).and_then(|s| s.get("offsets")) {
            Some(list) => parse_offsets(list)?,
            None => Vec::new(),
        };

        let mut images = Vec::new();
        for (section, properties) in ini.iter() {
            let Some(name) = section.and_then(|s| s.strip_prefix(IMAGE_SECTION_PREFIX)) else {
                continue;
            };
            images.push(parse_image(name, properties)?);
        }

        if images.is_empty() {
            return Err(CliError::Scenario(
                "scenario has no [image.<name>] sections".to_string(),
            ));
        }

        Ok(Self {
            viewport_height,
            placeholder,
            offsets,
            images,
        })
    }
}

fn parse_image(name: &str, properties: &Properties) -> Result<ScenarioImage, CliError> {
    let section = format!("{}{}", IMAGE_SECTION_PREFIX, name);
    let height = required_number(properties, &section, "height")?;
    if height < 0.0 {
        return Err(CliError::Scenario(format!(
            "[{}] height must not be negative",
            section
        )));
    }

    let fail = match properties.get("fail").map(str::trim) {
        None | Some("false") | Some("no") | Some("0") => false,
        Some("true") | Some("yes") | Some("1") => true,
        Some(other) => {
            return Err(CliError::Scenario(format!(
                "[{}] fail must be true or false, got '{}'",
                section, other
            )))
        }
    };

    Ok(ScenarioImage {
        name: name.to_string(),
        src: properties
            .get("src")
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string),
        top: required_number(properties, &section, "top")?,
        height,
        kind: properties
            .get("kind")
            .map(|tag| ElementKind::from_tag(tag.trim()))
            .unwrap_or(ElementKind::Image),
        fail,
    })
}

fn required_number(properties: &Properties, section: &str, key: &str) -> Result<f64, CliError> {
    let value = properties
        .get(key)
        .ok_or_else(|| CliError::Scenario(format!("[{}] is missing '{}'", section, key)))?;
    parse_number(value).ok_or_else(|| {
        CliError::Scenario(format!(
            "[{}] {} is not a number: '{}'",
            section, key, value
        ))
    })
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_offsets(list: &str) -> Result<Vec<f64>, CliError> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            parse_number(item).ok_or_else(|| {
                CliError::Scenario(format!("[scroll] offsets contains '{}'", item))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SCENARIO: &str = "\
[page]
viewport_height = 800
placeholder = blur.jpg

[scroll]
offsets = 0, 200, 1200

[image.hero]
src = https://cdn.example.com/hero.jpg
top = 900
height = 100

[image.banner]
src = https://cdn.example.com/banner.jpg
top = 1500
height = 300
kind = div
fail = true
";

    #[test]
    fn test_parse_full_scenario() {
        let scenario = Scenario::parse(SCENARIO).unwrap();

        assert_eq!(scenario.viewport_height, 800.0);
        assert_eq!(scenario.placeholder.as_deref(), Some("blur.jpg"));
        assert_eq!(scenario.offsets, vec![0.0, 200.0, 1200.0]);
        assert_eq!(scenario.images.len(), 2);

        let hero = &scenario.images[0];
        assert_eq!(hero.name, "hero");
        assert_eq!(hero.kind, ElementKind::Image);
        assert!(!hero.fail);

        let banner = &scenario.images[1];
        assert_eq!(banner.kind, ElementKind::Other("div".to_string()));
        assert!(banner.fail);
    }

    #[test]
    fn test_failing_sources() {
        let scenario = Scenario::parse(SCENARIO).unwrap();
        let failing: Vec<&str> = scenario.failing_sources().collect();
        assert_eq!(failing, vec!["https://cdn.example.com/banner.jpg"]);
    }

    #[test]
    fn test_missing_page_section() {
        let err = Scenario::parse("[image.a]\nsrc = a.png\ntop = 0\nheight = 1\n").unwrap_err();
        assert!(err.to_string().contains("[page]"));
    }

    #[test]
    fn test_bad_offset_is_rejected() {
        let text = "[page]\nviewport_height = 800\n[scroll]\noffsets = 0, down\n\
                    [image.a]\nsrc = a.png\ntop = 0\nheight = 1\n";
        let err = Scenario::parse(text).unwrap_err();
        assert!(err.to_string().contains("down"));
    }

    #[test]
    fn test_image_without_src_is_allowed() {
        let text = "[page]\nviewport_height = 600\n[image.empty]\ntop = 10\nheight = 20\n";
        let scenario = Scenario::parse(text).unwrap();
        assert_eq!(scenario.images[0].src, None);
        assert!(scenario.offsets.is_empty());
    }

    #[test]
    fn test_scenario_without_images_is_rejected() {
        assert!(Scenario::parse("[page]\nviewport_height = 800\n").is_err());
    }

    #[test]
    fn test_load_reads_scenario_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("feed.ini");
        std::fs::write(&path, SCENARIO).unwrap();

        let scenario = Scenario::load(&path).unwrap();

        assert_eq!(scenario, Scenario::parse(SCENARIO).unwrap());
        assert_eq!(scenario.images[0].name, "hero");
        assert_eq!(scenario.images[1].name, "banner");
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("absent.ini");

        let err = Scenario::load(&path).unwrap_err();

        assert!(err.to_string().contains("absent.ini"));
    }
}
