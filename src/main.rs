// SPDX-License-Identifier: GPL-3.0-or-later
// src/main.rs
//
// Application entry point.

mod app;
mod cli;
mod config;
mod constant;
mod domain;
mod i18n;
mod net;
mod runtime;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use sha2::{Digest, Sha256};

use crate::app::chooser_field::ChooserField;
use crate::app::{AppMessage, AppModel, HostEvent};
use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::domain::choice::ModalKind;
use crate::domain::crop::{CropInitial, CropRect, CropSynchronizer, ImageSize};
use crate::domain::filter_spec::{CropperParams, encode_query};
use crate::domain::upload::{FileInfo, UploadStatus};
use crate::net::HttpTransport;
use crate::runtime::Runtime;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .with_module_level("modalflow", level)
        .init()?;

    let requested_languages = i18n_embed::DesktopLanguageRequester::requested_languages();
    i18n::init(&requested_languages);

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    if let Some(base_url) = &cli.base_url {
        config.base_url.clone_from(base_url);
    }
    if let Some(cookie) = &cli.cookie {
        config.session_cookie = Some(cookie.clone());
    }

    match cli.command {
        Commands::Crop {
            image,
            size,
            ratio,
            select,
            width,
            height,
            force_selection,
            pps,
        } => {
            let size = image_size(image.as_deref(), size.as_deref())?;
            let mut crop = CropSynchronizer::new(CropInitial {
                size: Some(size),
                ratio_choice: ratio,
                force_selection,
                ..CropInitial::default()
            });
            if let Some(select) = select {
                let rect = CropRect::parse_param(&select)
                    .with_context(|| format!("invalid selection `{select}`"))?;
                if !rect.is_valid_for(size) {
                    bail!("selection {select} does not fit a {}x{} image", size.width, size.height);
                }
                crop.select(rect.as_selection());
            }
            if let Some(width) = width {
                crop.on_width_input(&width);
            }
            if let Some(height) = height {
                crop.on_height_input(&height);
            }
            let fields = crop.form_fields();
            let spec = crop.filter_spec(pps.as_deref());
            if cli.json {
                let fields: serde_json::Map<String, serde_json::Value> = fields
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::String(v)))
                    .collect();
                let out = serde_json::json!({
                    "fields": fields,
                    "area": crop.area_label(),
                    "crop": crop.coords.map(|c| c.as_param()),
                    "spec": spec,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for (name, value) in fields {
                    println!("{name}={value}");
                }
                println!("area: {}", crop.area_label());
                if let Some(coords) = crop.coords {
                    println!("crop: {}", coords.as_param());
                }
                if let Some(spec) = spec {
                    println!("spec: {spec}");
                }
            }
        }

        Commands::Search {
            query,
            kind,
            collection,
            tag,
            page,
        } => {
            let kind = ModalKind::from(kind);
            let mut model = AppModel::new(config.clone());
            let mut runtime = Runtime::new(HttpTransport::new(&config)?);
            let url = config.chooser_url(kind);
            runtime.dispatch(&mut model, AppMessage::OpenModal { kind, url });
            runtime.run_until_idle(&mut model).await;

            let mut steps = Vec::new();
            if let Some(collection) = collection {
                steps.push(AppMessage::CollectionChanged(Some(collection)));
            }
            steps.push(match query {
                Some(query) => AppMessage::SearchInput(query),
                None => AppMessage::SearchSubmit,
            });
            if let Some(tag) = tag {
                steps.push(AppMessage::TagClicked(tag));
            }
            if let Some(page) = page {
                steps.push(AppMessage::PageClicked(page));
            }
            for step in steps {
                runtime.dispatch(&mut model, step);
                runtime.run_until_idle(&mut model).await;
            }

            let Some(chooser) = model.modal.as_ref().and_then(|modal| modal.chooser()) else {
                bail!("the chooser did not open");
            };
            let bindings = chooser.results.bindings();
            if cli.json {
                let out = serde_json::json!({
                    "results": bindings.result_links,
                    "pages": bindings.pages,
                    "tags": bindings.suggested_tags,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for link in &bindings.result_links {
                    println!("{link}");
                }
                if !bindings.pages.is_empty() {
                    let pages: Vec<String> = bindings.pages.iter().map(u32::to_string).collect();
                    println!("pages: {}", pages.join(" "));
                }
            }
        }

        Commands::Browse {
            url,
            kind,
            rendition,
            recrop,
            current,
            cropper,
            html,
            upload,
            click,
            select,
            ratio,
            width,
            height,
            submit,
        } => {
            let kind = ModalKind::from(kind);
            let mut field = ChooserField::new(kind, config.chooser_url(kind));
            if rendition || recrop.is_some() {
                field = field.rendition(cropper.into());
                field.original_id = recrop;
                field.spec = current;
            }
            let mut model = AppModel::new(config.clone()).with_field(field);
            let mut runtime = Runtime::new(HttpTransport::new(&config)?);

            let open = match (url, recrop) {
                (Some(url), _) => AppMessage::OpenModal { kind, url },
                (None, Some(_)) => AppMessage::OpenRecrop,
                (None, None) => AppMessage::OpenChooser,
            };
            let mut steps = vec![open];
            if let Some(path) = upload {
                let file = FileInfo::from_path(&path).with_context(|| format!("reading {}", path.display()))?;
                steps.push(AppMessage::ChooserUpload {
                    file,
                    fields: Vec::new(),
                });
            }
            steps.extend(click.into_iter().map(AppMessage::ResultClicked));
            let crop_requested = select.is_some() || ratio.is_some() || width.is_some() || height.is_some();
            if let Some(ratio) = ratio {
                steps.push(AppMessage::CropRatioChanged(ratio));
            }
            if let Some(select) = select {
                let rect = CropRect::parse_param(&select).with_context(|| format!("invalid selection `{select}`"))?;
                steps.push(AppMessage::CropSelect(rect.as_selection()));
            }
            if let Some(width) = width {
                steps.push(AppMessage::CropWidthInput(width));
            }
            if let Some(height) = height {
                steps.push(AppMessage::CropHeightInput(height));
            }
            if !submit.is_empty() {
                steps.push(AppMessage::SubmitForm(submit));
            }

            for step in steps {
                runtime.dispatch(&mut model, step);
                let events = runtime.run_until_idle(&mut model).await;
                print_modal_events(events, cli.json)?;
                let upload_error = model
                    .modal
                    .as_ref()
                    .and_then(|modal| modal.chooser())
                    .and_then(|chooser| chooser.upload_error.clone());
                if let Some(error) = upload_error {
                    bail!("{error}");
                }
            }
            if crop_requested && let Some(crop) = model.modal.as_ref().and_then(|modal| modal.crop()) {
                log::debug!("submitting crop {:?}", crop.form_fields());
                runtime.dispatch(&mut model, AppMessage::SubmitCrop);
                let events = runtime.run_until_idle(&mut model).await;
                print_modal_events(events, cli.json)?;
            }
            if html && let Some(modal) = model.modal.as_ref().filter(|modal| !modal.is_closed()) {
                println!("{}", modal.body.html());
            }
        }

        Commands::Upload {
            files,
            single_file,
            fields,
            delete,
        } => {
            let files = files
                .iter()
                .map(|path| FileInfo::from_path(path).with_context(|| format!("reading {}", path.display())))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let mut model = AppModel::new(config.clone());
            model.uploader.single_file = single_file;
            let mut runtime = Runtime::new(HttpTransport::new(&config)?);
            runtime.dispatch(&mut model, AppMessage::FilesAdded(files));
            runtime.run_until_idle(&mut model).await;

            let mut failed = 0;
            for item in &model.uploader.items {
                let percent = item.progress;
                println!("{}", fl!("progress", name = item.file.name.clone(), percent = percent));
                if item.status == UploadStatus::Failure {
                    failed += 1;
                    eprintln!("  {}", item.error.as_deref().unwrap_or_default());
                }
            }

            let uploaded: Vec<u64> = model
                .uploader
                .items
                .iter()
                .filter(|item| item.status == UploadStatus::Success)
                .map(|item| item.id)
                .collect();
            for item in uploaded {
                if delete {
                    runtime.dispatch(&mut model, AppMessage::DeleteItem(item));
                } else if !fields.is_empty() {
                    runtime.dispatch(
                        &mut model,
                        AppMessage::FinalizeItem {
                            item,
                            fields: fields.clone(),
                        },
                    );
                }
            }
            runtime.run_until_idle(&mut model).await;
            for item in &model.uploader.items {
                if let Some(error) = &item.error
                    && item.status == UploadStatus::Success
                {
                    eprintln!("{}: {error}", item.file.name);
                }
            }

            if failed > 0 {
                bail!("{failed} upload(s) failed");
            }
        }

        Commands::Preview { action, fields } => {
            let mut model = AppModel::new(config.clone());
            let mut runtime = Runtime::new(HttpTransport::new(&config)?);
            let action = config.url(&action);
            let target = preview_path(&config, &action);
            runtime.dispatch(
                &mut model,
                AppMessage::RequestPreview {
                    action,
                    fields,
                },
            );
            for event in runtime.run_until_idle(&mut model).await {
                match event {
                    HostEvent::PreviewOpened => write_preview(&target, constant::PREVIEW_PLACEHOLDER)?,
                    HostEvent::PreviewWrite(body) => {
                        write_preview(&target, &body)?;
                        open::that(&target).with_context(|| format!("opening {}", target.display()))?;
                    }
                    HostEvent::PreviewClosed => {
                        if let Err(e) = std::fs::remove_file(&target) {
                            log::debug!("removing {}: {e}", target.display());
                        }
                    }
                    HostEvent::DocumentReplaced(body) => println!("{body}"),
                    other => log::debug!("{other:?}"),
                }
            }
        }

        Commands::Spec {
            current,
            cropper,
            ignore_spec,
        } => {
            let params = CropperParams::from(cropper);
            let query = params.query(current.as_deref(), ignore_spec);
            println!("{}", encode_query(&query));
            let initial = CropperParams::initial_from_query(&query);
            if let Some(crop) = initial.crop {
                let spec = domain::filter_spec::rendition_spec(crop, initial.fit, params.pps.as_deref());
                println!("spec: {spec}");
            }
        }
    }

    Ok(())
}

fn print_modal_events(events: Vec<HostEvent>, json: bool) -> anyhow::Result<()> {
    for event in events {
        match event {
            HostEvent::ModalStep(step) if !json => println!("step: {step}"),
            HostEvent::Chosen(choice) => println!("{}", serde_json::to_string_pretty(&choice)?),
            other => log::debug!("{other:?}"),
        }
    }
    Ok(())
}

/// True image size, read from the file when possible.
fn image_size(image: Option<&Path>, size: Option<&str>) -> anyhow::Result<ImageSize> {
    if let Some(size) = size {
        return ImageSize::parse(size).with_context(|| format!("invalid size `{size}`"));
    }
    let Some(path) = image else {
        bail!("either --image or --size is required");
    };
    read_dimensions(path)
}

#[cfg(feature = "image")]
fn read_dimensions(path: &Path) -> anyhow::Result<ImageSize> {
    let (width, height) = image::image_dimensions(path)
        .with_context(|| format!("reading dimensions of {}", path.display()))?;
    Ok(ImageSize::new(width, height))
}

#[cfg(not(feature = "image"))]
fn read_dimensions(path: &Path) -> anyhow::Result<ImageSize> {
    bail!("built without image support, pass --size instead of {}", path.display())
}

/// Stable preview file per preview action.
fn preview_path(config: &AppConfig, action: &str) -> PathBuf {
    let digest = Sha256::digest(action.as_bytes());
    config
        .preview_dir()
        .join(format!("{digest:x}.{}", constant::PREVIEW_EXT))
}

fn write_preview(path: &Path, html: &str) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    std::fs::write(path, html).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_path_is_stable_per_action() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            cache_dir: Some(dir.path().to_path_buf()),
            ..AppConfig::default()
        };
        let a = preview_path(&config, "http://cms/admin/pages/1/edit/preview/");
        let b = preview_path(&config, "http://cms/admin/pages/1/edit/preview/");
        let c = preview_path(&config, "http://cms/admin/pages/2/edit/preview/");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.extension().and_then(|e| e.to_str()), Some("html"));

        write_preview(&a, "<p>hi</p>").unwrap();
        assert_eq!(std::fs::read_to_string(&a).unwrap(), "<p>hi</p>");
    }

    #[test]
    fn size_argument_wins_over_image() {
        assert_eq!(
            image_size(Some(Path::new("/does/not/exist.jpg")), Some("1920x1080")).unwrap(),
            ImageSize::new(1920, 1080)
        );
        assert!(image_size(None, None).is_err());
    }
}
