// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/chooser_field.rs
//
// Form field that stores what a chooser modal returned.

use crate::domain::choice::{Choice, ModalKind, Preview};
use crate::domain::filter_spec::{CropperParams, encode_query};

/// Image, document, rendition or link field on an edit form.
#[derive(Debug, Clone, Default)]
pub struct ChooserField {
    pub kind: ModalKind,
    /// Chooser view the modal opens on.
    pub chooser_url: String,
    /// Rendition fields go through the cropper after choosing.
    pub rendition: bool,
    pub cropper: CropperParams,

    pub value: Option<u64>,
    pub title: Option<String>,
    pub preview: Option<Preview>,
    pub edit_link: Option<String>,
    pub original_id: Option<u64>,
    pub spec: Option<String>,
    /// Link fields store a URL instead of an id.
    pub link: Option<String>,
}

impl ChooserField {
    pub fn new(kind: ModalKind, chooser_url: impl Into<String>) -> Self {
        Self {
            kind,
            chooser_url: chooser_url.into(),
            ..Self::default()
        }
    }

    pub fn rendition(mut self, cropper: CropperParams) -> Self {
        self.rendition = true;
        self.cropper = cropper;
        self
    }

    pub fn is_blank(&self) -> bool {
        self.value.is_none() && self.link.is_none()
    }

    /// URL of the "choose" button. A new image starts from a fresh crop, so
    /// the current spec is not passed on.
    pub fn choose_url(&self) -> String {
        if !self.rendition {
            return self.chooser_url.clone();
        }
        let mut params = vec![("select_rendition".to_string(), "True".to_string())];
        params.extend(self.cropper.query(self.spec.as_deref(), true));
        format!("{}?{}", self.chooser_url, encode_query(&params))
    }

    /// URL of the "edit crop" button of a rendition field.
    pub fn recrop_url(&self) -> Option<String> {
        let original = self.original_id?;
        let params = self.cropper.query(self.spec.as_deref(), false);
        Some(format!(
            "{}/{original}/select_rendition/?{}",
            self.chooser_url.trim_end_matches('/'),
            encode_query(&params)
        ))
    }

    /// Take over a chosen result. Returns `false` for results this field
    /// cannot hold.
    pub fn apply(&mut self, choice: &Choice) -> bool {
        match (self.kind, choice) {
            (ModalKind::Image, Choice::Image(image)) => {
                self.value = Some(image.id);
                self.title = Some(image.title.clone());
                self.preview = Some(image.preview.clone());
                self.edit_link = image.edit_link.clone();
                self.original_id = image.original_id;
                self.spec = image.spec.clone();
                true
            }
            (ModalKind::Document, Choice::Document(document)) => {
                self.value = Some(document.id);
                self.title = Some(document.title.clone());
                self.edit_link = document.edit_link.clone();
                true
            }
            (ModalKind::Link, Choice::Link(link)) => {
                self.link = Some(link.url.clone());
                self.title = Some(link.title.clone());
                true
            }
            _ => {
                log::warn!("{} field cannot hold a {} result", self.kind, choice.event());
                false
            }
        }
    }

    pub fn clear(&mut self) {
        self.value = None;
        self.title = None;
        self.preview = None;
        self.edit_link = None;
        self.original_id = None;
        self.spec = None;
        self.link = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::choice::{DocumentChoice, ImageChoice, LinkChoice};

    fn rendition_field() -> ChooserField {
        ChooserField::new(ModalKind::Image, "/admin/images/chooser/").rendition(CropperParams {
            ratios: Some("1:1,16:9".to_string()),
            force_selection: Some("True".to_string()),
            ..CropperParams::default()
        })
    }

    fn rendition_choice() -> Choice {
        Choice::Image(ImageChoice {
            id: 40,
            title: "Cat".to_string(),
            preview: Preview {
                url: "/media/cat.jpg".to_string(),
                width: 165,
                height: 100,
            },
            original_id: Some(12),
            spec: Some("crop-0,0:800,450|forcefit-1600x900".to_string()),
            edit_link: None,
            format: None,
            alt: None,
            html: None,
        })
    }

    #[test]
    fn choose_url_ignores_current_spec() {
        let mut field = rendition_field();
        field.apply(&rendition_choice());
        assert_eq!(
            field.choose_url(),
            "/admin/images/chooser/?select_rendition=True&ratios=1%3A1%2C16%3A9&fsel=T"
        );
    }

    #[test]
    fn recrop_url_carries_spec_crop() {
        let mut field = rendition_field();
        assert_eq!(field.recrop_url(), None);
        field.apply(&rendition_choice());
        assert_eq!(
            field.recrop_url().unwrap(),
            "/admin/images/chooser/12/select_rendition/?crop=0%2C0%2C800%2C450&fit=1600x900&ratios=1%3A1%2C16%3A9&fsel=T"
        );
    }

    #[test]
    fn apply_and_clear() {
        let mut field = ChooserField::new(ModalKind::Document, "/admin/documents/chooser/");
        assert!(field.is_blank());
        assert!(!field.apply(&rendition_choice()));
        assert!(field.apply(&Choice::Document(DocumentChoice {
            id: 3,
            title: "Report".to_string(),
            url: None,
            filename: None,
            edit_link: Some("/admin/documents/edit/3/".to_string()),
        })));
        assert_eq!(field.value, Some(3));
        assert_eq!(field.choose_url(), "/admin/documents/chooser/");
        field.clear();
        assert!(field.is_blank());
        assert_eq!(field.edit_link, None);
    }

    #[test]
    fn link_field_holds_url() {
        let mut field = ChooserField::new(ModalKind::Link, "/admin/choose-external-link/");
        assert!(field.apply(&Choice::Link(LinkChoice {
            url: "https://example.org".to_string(),
            title: "Example".to_string(),
            new_window: false,
        })));
        assert!(!field.is_blank());
        assert_eq!(field.link.as_deref(), Some("https://example.org"));
        field.clear();
        assert!(field.is_blank());
    }
}
