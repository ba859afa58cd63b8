// SPDX-License-Identifier: GPL-3.0-or-later
// src/cli.rs
//
// Command line interface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::choice::ModalKind;
use crate::domain::filter_spec::CropperParams;

#[derive(Parser, Debug)]
#[command(name = "modalflow", version, about = "Drive CMS admin choosers, crops and uploads")]
pub struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(long, global = true, help = "Config file (defaults to the user config dir)")]
    pub config: Option<PathBuf>,
    #[arg(long, global = true, help = "Admin base URL, e.g. https://cms.example.org/admin")]
    pub base_url: Option<String>,
    #[arg(long, global = true, help = "Cookie header of an authenticated admin session")]
    pub cookie: Option<String>,
    #[arg(short, long, global = true, help = "Log debug output")]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the crop form offline and print what it would submit.
    Crop {
        #[arg(long, help = "Image file to read the true size from")]
        image: Option<PathBuf>,
        #[arg(long, help = "True image size as WxH")]
        size: Option<String>,
        #[arg(long, help = "Ratio choice (N:D or free)")]
        ratio: Option<String>,
        #[arg(long, help = "Selection as left,top,right,bottom")]
        select: Option<String>,
        #[arg(long)]
        width: Option<String>,
        #[arg(long)]
        height: Option<String>,
        #[arg(long, default_value_t = false)]
        force_selection: bool,
        #[arg(long, help = "Post-processing filters appended to the rendition spec")]
        pps: Option<String>,
    },
    /// Search a chooser.
    Search {
        query: Option<String>,
        #[arg(long, value_enum, default_value_t = Kind::Image)]
        kind: Kind,
        #[arg(long)]
        collection: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Open a chooser modal and print where it ends up.
    ///
    /// Without a URL the modal opens the way the field's choose button does.
    Browse {
        url: Option<String>,
        #[arg(long, value_enum, default_value_t = Kind::Image)]
        kind: Kind,
        #[arg(long, default_value_t = false, help = "Choose a rendition through the cropper")]
        rendition: bool,
        #[arg(long, value_name = "IMAGE_ID", help = "Re-crop the rendition of this original image")]
        recrop: Option<u64>,
        #[arg(long, help = "Current rendition spec of the field")]
        current: Option<String>,
        #[command(flatten)]
        cropper: CropperArgs,
        #[arg(long, default_value_t = false, help = "Print the markup of the last step")]
        html: bool,
        #[arg(long, help = "Upload a file through the chooser's upload form first")]
        upload: Option<PathBuf>,
        #[arg(long, help = "Result link to follow (repeatable)")]
        click: Vec<String>,
        #[arg(long, help = "Crop selection as left,top,right,bottom")]
        select: Option<String>,
        #[arg(long, help = "Ratio choice for the crop")]
        ratio: Option<String>,
        #[arg(long)]
        width: Option<String>,
        #[arg(long)]
        height: Option<String>,
        #[arg(long = "submit", value_parser = parse_field, help = "Submit the step's form with name=value")]
        submit: Vec<(String, String)>,
    },
    /// Upload files one after another.
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, default_value_t = false)]
        single_file: bool,
        #[arg(long = "field", value_parser = parse_field, help = "Metadata saved for every uploaded file")]
        fields: Vec<(String, String)>,
        #[arg(long, default_value_t = false, help = "Delete the files again after uploading")]
        delete: bool,
    },
    /// Render a page preview and open it.
    Preview {
        action: String,
        #[arg(long = "field", value_parser = parse_field, help = "Form field as name=value")]
        fields: Vec<(String, String)>,
    },
    /// Print the cropper URL parameters for a rendition field.
    Spec {
        #[arg(long, help = "Current rendition spec")]
        current: Option<String>,
        #[command(flatten)]
        cropper: CropperArgs,
        #[arg(long, default_value_t = false, help = "Leave out the current crop (new image)")]
        ignore_spec: bool,
    },
}

/// Cropper URL parameters of a rendition field.
#[derive(Args, Debug, Clone, Default)]
pub struct CropperArgs {
    #[arg(long, help = "Explicit crop as l,t,r,b")]
    pub crop: Option<String>,
    #[arg(long, help = "Comma separated ratio choices")]
    pub ratios: Option<String>,
    #[arg(long)]
    pub default_ratio: Option<String>,
    #[arg(long)]
    pub force_selection: Option<String>,
    #[arg(long)]
    pub disable_selection: Option<String>,
    #[arg(long, help = "Post-processing filters appended to the rendition spec")]
    pub pps: Option<String>,
}

impl From<CropperArgs> for CropperParams {
    fn from(args: CropperArgs) -> Self {
        Self {
            crop: args.crop,
            ratios: args.ratios,
            default_ratio: args.default_ratio,
            force_selection: args.force_selection,
            disable_selection: args.disable_selection,
            pps: args.pps,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Image,
    Document,
    Link,
}

impl From<Kind> for ModalKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Image => ModalKind::Image,
            Kind::Document => ModalKind::Document,
            Kind::Link => ModalKind::Link,
        }
    }
}

fn parse_field(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got `{value}`"))
}
