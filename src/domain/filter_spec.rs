// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/filter_spec.rs
//
// Rendition filter specs (`op-arg|op-arg`) and cropper URL parameters.

use std::collections::HashMap;

use super::crop::{CropInitial, CropRect};

/// Split a filter spec into `op -> arg`. Entries that are not exactly
/// `op-arg` are skipped.
pub fn parse(spec: &str) -> HashMap<String, String> {
    spec.split('|')
        .filter_map(|part| {
            let mut pieces = part.split('-');
            match (pieces.next(), pieces.next(), pieces.next()) {
                (Some(op), Some(arg), None) => Some((op.to_string(), arg.to_string())),
                _ => None,
            }
        })
        .collect()
}

/// Spec built for a user rendition: `crop-l,t:r,b[|forcefit-WxH][|pps]`.
pub fn rendition_spec(crop: CropRect, fit: Option<(u32, u32)>, post_processing: Option<&str>) -> String {
    let mut spec = crop.filter();
    if let Some((width, height)) = fit.filter(|(w, h)| *w > 0 && *h > 0) {
        spec.push_str(&format!("|forcefit-{width}x{height}"));
    }
    if let Some(pps) = post_processing.filter(|p| !p.is_empty()) {
        spec.push('|');
        spec.push_str(pps);
    }
    spec
}

/// Cropper configuration carried by a rendition chooser field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CropperParams {
    /// Explicit `l,t,r,b`; overrides the crop stored in the current spec.
    pub crop: Option<String>,
    /// Comma separated ratio choices.
    pub ratios: Option<String>,
    pub default_ratio: Option<String>,
    pub force_selection: Option<String>,
    pub disable_selection: Option<String>,
    /// Post-processing spec appended to the rendition spec.
    pub pps: Option<String>,
}

impl CropperParams {
    /// URL parameters for the cropper view, in the order the server
    /// documents them. With `ignore_spec` the current rendition's crop and
    /// fit are left out (choosing a new image).
    pub fn query(&self, spec: Option<&str>, ignore_spec: bool) -> Vec<(String, String)> {
        let (crop_spec, fit) = match spec {
            Some(spec) if !ignore_spec => {
                let dict = parse(spec);
                match dict.get("crop") {
                    Some(crop) => (Some(crop.replacen(':', ",", 1)), dict.get("forcefit").cloned()),
                    None => (None, None),
                }
            }
            _ => (None, None),
        };
        let first_char = |flag: &Option<String>| {
            flag.as_deref()
                .and_then(|f| f.chars().next())
                .map(String::from)
        };

        [
            ("crop", self.crop.clone().or(crop_spec)),
            ("fit", fit),
            ("ratios", self.ratios.clone()),
            ("ar", self.default_ratio.clone()),
            ("fsel", first_char(&self.force_selection)),
            ("dsel", first_char(&self.disable_selection)),
            ("pps", self.pps.clone()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
        .collect()
    }

    /// Interpret cropper URL parameters the way the rendition view does.
    pub fn initial_from_query(query: &[(String, String)]) -> CropInitial {
        let get = |name: &str| {
            query
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };
        let force = get("fsel") == Some("T");
        let disable = get("dsel") == Some("T");
        let fit = get("fit").and_then(|fit| {
            let (w, h) = fit.split_once('x')?;
            Some((w.parse().ok()?, h.parse().ok()?))
        });
        CropInitial {
            size: None,
            crop: get("crop").and_then(CropRect::parse_param),
            fit,
            ratios: get("ratios")
                .map(|r| r.split(',').map(String::from).collect())
                .unwrap_or_default(),
            ratio_choice: get("ar").map(String::from),
            force_selection: force || disable,
        }
    }
}

/// Encode parameters as an `application/x-www-form-urlencoded` query.
pub fn encode_query(params: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_two_part_filters_only() {
        let dict = parse("crop-10,20:30,40|forcefit-300x200|bogus|a-b-c");
        assert_eq!(dict.get("crop").map(String::as_str), Some("10,20:30,40"));
        assert_eq!(dict.get("forcefit").map(String::as_str), Some("300x200"));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn rendition_spec_appends_fit_and_post_processing() {
        let crop = CropRect::new(1, 2, 3, 4);
        assert_eq!(rendition_spec(crop, None, None), "crop-1,2:3,4");
        assert_eq!(
            rendition_spec(crop, Some((30, 40)), Some("grayscale-on")),
            "crop-1,2:3,4|forcefit-30x40|grayscale-on"
        );
        assert_eq!(rendition_spec(crop, Some((0, 40)), None), "crop-1,2:3,4");
    }

    #[test]
    fn query_uses_spec_crop_unless_ignored() {
        let params = CropperParams {
            ratios: Some("1:1,16:9".to_string()),
            force_selection: Some("True".to_string()),
            ..CropperParams::default()
        };
        let spec = "crop-10,20:30,40|forcefit-300x200";
        assert_eq!(
            encode_query(&params.query(Some(spec), false)),
            "crop=10%2C20%2C30%2C40&fit=300x200&ratios=1%3A1%2C16%3A9&fsel=T"
        );
        assert_eq!(
            encode_query(&params.query(Some(spec), true)),
            "ratios=1%3A1%2C16%3A9&fsel=T"
        );
    }

    #[test]
    fn explicit_crop_overrides_spec() {
        let params = CropperParams {
            crop: Some("0,0,5,5".to_string()),
            ..CropperParams::default()
        };
        let query = params.query(Some("crop-10,20:30,40"), false);
        assert_eq!(query[0], ("crop".to_string(), "0,0,5,5".to_string()));
    }

    #[test]
    fn initial_from_query_reads_cropper_settings() {
        let query: Vec<(String, String)> = [
            ("crop", "1,2,30,40"),
            ("fit", "300x200"),
            ("ratios", "1:1,free"),
            ("ar", "1:1"),
            ("dsel", "T"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let initial = CropperParams::initial_from_query(&query);
        assert_eq!(initial.crop, Some(CropRect::new(1, 2, 30, 40)));
        assert_eq!(initial.fit, Some((300, 200)));
        assert_eq!(initial.ratios, vec!["1:1", "free"]);
        assert_eq!(initial.ratio_choice.as_deref(), Some("1:1"));
        assert!(initial.force_selection);
    }
}
