// SPDX-License-Identifier: GPL-3.0-or-later
// src/app/fragment.rs
//
// Server-rendered HTML fragments and the interactive bindings found in them.
//
// Markup stays opaque. Every swap goes through `Fragment::new`, which
// rescans the links, pagination, forms and crop image, so replaced content
// is always interactive again.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::domain::crop::{CropInitial, CropRect, ImageSize, parse_leading_int};

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

static RESULT_LINK: LazyLock<Selector> = LazyLock::new(|| selector(".listing a, a.document-choice"));
static PAGE_LINK: LazyLock<Selector> = LazyLock::new(|| selector(".pagination a[data-page]"));
static SUGGESTED_TAG: LazyLock<Selector> = LazyLock::new(|| selector("a.suggested-tag"));
static SEARCH_FORM: LazyLock<Selector> =
    LazyLock::new(|| selector("form.image-search, form.document-search"));
static COLLECTION_OPTION: LazyLock<Selector> =
    LazyLock::new(|| selector("#collection_chooser_collection_id option"));
static FORM: LazyLock<Selector> = LazyLock::new(|| selector("form"));
static FORM_CONTROL: LazyLock<Selector> = LazyLock::new(|| selector("input, select, textarea"));
static OPTION: LazyLock<Selector> = LazyLock::new(|| selector("option"));
static CROP_IMAGE: LazyLock<Selector> = LazyLock::new(|| selector(".crop-image img"));
static DELETE_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a.delete"));

/// A `<form>` with the values it would serialize as rendered.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormBinding {
    pub classes: Vec<String>,
    pub action: Option<String>,
    pub method: String,
    /// Successful controls in document order (`$(form).serialize()`).
    pub fields: Vec<(String, String)>,
    /// Every radio option: `(name, value, checked)`.
    pub radios: Vec<(String, String, bool)>,
    /// Names of `<input type="file">` controls.
    pub file_fields: Vec<String>,
}

impl FormBinding {
    fn scan(form: ElementRef<'_>) -> Self {
        let element = form.value();
        let mut binding = Self {
            classes: element.classes().map(String::from).collect(),
            action: element.attr("action").map(String::from),
            method: element.attr("method").unwrap_or("get").to_ascii_lowercase(),
            ..Self::default()
        };

        for control in form.select(&FORM_CONTROL) {
            let el = control.value();
            let Some(name) = el.attr("name") else {
                continue;
            };
            if el.attr("disabled").is_some() {
                continue;
            }
            match el.name() {
                "select" => {
                    let options: Vec<ElementRef<'_>> = control.select(&OPTION).collect();
                    let chosen = options
                        .iter()
                        .find(|o| o.value().attr("selected").is_some())
                        .or_else(|| options.first());
                    if let Some(option) = chosen {
                        binding.fields.push((name.to_string(), option_value(option)));
                    }
                }
                "textarea" => {
                    binding
                        .fields
                        .push((name.to_string(), control.text().collect::<String>()));
                }
                _ => {
                    let kind = el.attr("type").unwrap_or("text").to_ascii_lowercase();
                    let value = el.attr("value").unwrap_or_default().to_string();
                    let checked = el.attr("checked").is_some();
                    match kind.as_str() {
                        "file" => binding.file_fields.push(name.to_string()),
                        "submit" | "button" | "image" | "reset" => {}
                        "radio" => {
                            binding.radios.push((name.to_string(), value.clone(), checked));
                            if checked {
                                binding.fields.push((name.to_string(), value));
                            }
                        }
                        "checkbox" => {
                            if checked {
                                let value = if value.is_empty() { "on".to_string() } else { value };
                                binding.fields.push((name.to_string(), value));
                            }
                        }
                        _ => binding.fields.push((name.to_string(), value)),
                    }
                }
            }
        }
        binding
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replace (or add) a field value, keeping document order.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(key, _)| key == name) {
            Some(field) => field.1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }
}

fn option_value(option: &ElementRef<'_>) -> String {
    option
        .value()
        .attr("value")
        .map(String::from)
        .unwrap_or_else(|| option.text().collect::<String>().trim().to_string())
}

/// Interactive parts of a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bindings {
    /// Result links that drill down into the modal.
    pub result_links: Vec<String>,
    pub pages: Vec<u32>,
    pub suggested_tags: Vec<String>,
    pub search_action: Option<String>,
    pub collections: Vec<String>,
    pub forms: Vec<FormBinding>,
    pub crop_image: Option<ImageSize>,
    pub delete_links: Vec<String>,
}

impl Bindings {
    pub fn scan(html: &str) -> Self {
        let document = Html::parse_fragment(html);

        let href = |el: ElementRef<'_>| el.value().attr("href").map(String::from);

        let mut result_links: Vec<String> = document.select(&RESULT_LINK).filter_map(href).collect();
        result_links.dedup();

        let mut pages: Vec<u32> = document
            .select(&PAGE_LINK)
            .filter_map(|el| el.value().attr("data-page")?.trim().parse().ok())
            .collect();
        pages.sort_unstable();
        pages.dedup();

        let crop_image = document.select(&CROP_IMAGE).last().and_then(|img| {
            let dim = |name| parse_leading_int(img.value().attr(name)?).and_then(|v| u32::try_from(v).ok());
            Some(ImageSize::new(dim("width")?, dim("height")?))
        });

        Self {
            result_links,
            pages,
            suggested_tags: document
                .select(&SUGGESTED_TAG)
                .map(|el| el.text().collect::<String>().trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
            search_action: document
                .select(&SEARCH_FORM)
                .next()
                .and_then(|form| form.value().attr("action").map(String::from)),
            collections: document
                .select(&COLLECTION_OPTION)
                .map(|o| option_value(&o))
                .collect(),
            forms: document.select(&FORM).map(FormBinding::scan).collect(),
            crop_image,
            delete_links: document.select(&DELETE_LINK).filter_map(href).collect(),
        }
    }

    /// First form carrying `class`.
    pub fn form_with_class(&self, class: &str) -> Option<&FormBinding> {
        self.forms.iter().find(|form| form.has_class(class))
    }

    /// Cropper state as rendered in a rendition form.
    pub fn crop_initial(&self) -> CropInitial {
        let Some(form) = self
            .forms
            .iter()
            .find(|form| form.field("left").is_some() || form.radios.iter().any(|r| r.0 == "aspect-ratio"))
        else {
            return CropInitial {
                size: self.crop_image,
                ..CropInitial::default()
            };
        };

        let number = |name: &str| {
            form.field(name)
                .and_then(parse_leading_int)
                .and_then(|v| u32::try_from(v).ok())
        };
        let crop = match (number("left"), number("top"), number("right"), number("bottom")) {
            (Some(left), Some(top), Some(right), Some(bottom)) => {
                Some(CropRect::new(left, top, right, bottom))
            }
            _ => None,
        };
        let fit = number("width").zip(number("height"));
        let ratios = form
            .radios
            .iter()
            .filter(|(name, _, _)| name == "aspect-ratio")
            .map(|(_, value, _)| value.clone())
            .collect();
        let ratio_choice = form
            .radios
            .iter()
            .find(|(name, _, checked)| name == "aspect-ratio" && *checked)
            .map(|(_, value, _)| value.clone());

        CropInitial {
            size: self.crop_image,
            crop,
            fit,
            ratios,
            ratio_choice,
            force_selection: form.field("force_selection") == Some("True"),
        }
    }
}

/// Markup plus the bindings scanned from it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fragment {
    html: String,
    bindings: Bindings,
}

impl Fragment {
    pub fn new(html: impl Into<String>) -> Self {
        let html = html.into();
        let bindings = Bindings::scan(&html);
        Self { html, bindings }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }
}

/// Resolve `href` against the URL of the page it came from.
pub fn resolve_url(base: &str, href: &str) -> String {
    url::Url::parse(base)
        .and_then(|base| base.join(href))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}
