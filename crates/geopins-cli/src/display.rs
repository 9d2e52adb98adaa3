//! Display utilities for formatting CLI output.
//!
//! This module provides table row structures and formatting functions
//! for presenting pins and their contents in a human-readable format.

use arrow_array::RecordBatch;
use geopins_core::filetypes::Filetype;
use geopins_core::{DriverInfo, PinObject};
use geopins_core_common::{GeoTable, Meta, PinData, RasterGrid, VersionMeta};
use tabled::{Table, Tabled};

/// Table row representation for displaying a registered filetype.
#[derive(Tabled)]
pub struct FiletypeRow {
    /// Code recorded in pin metadata.
    #[tabled(rename = "Type")]
    pub code: String,
    /// Display name of the filetype.
    #[tabled(rename = "Name")]
    pub display_name: String,
    /// Support for generic board values.
    #[tabled(rename = "Table/JSON")]
    pub generic: String,
    /// Support for vector tables.
    #[tabled(rename = "GeoTable")]
    pub geo_table: String,
    /// Support for raster grids.
    #[tabled(rename = "RasterGrid")]
    pub raster: String,
}

impl From<&Filetype> for FiletypeRow {
    fn from(filetype: &Filetype) -> Self {
        Self {
            code: filetype.code.to_string(),
            display_name: filetype.display_name.to_string(),
            generic: filetype.support.generic.as_str().to_string(),
            geo_table: filetype.support.geo_table.as_str().to_string(),
            raster: filetype.support.raster.as_str().to_string(),
        }
    }
}

/// Table row representation for displaying a pin version.
#[derive(Tabled)]
pub struct VersionRow {
    #[tabled(rename = "Version")]
    pub version: String,
    #[tabled(rename = "Created")]
    pub created: String,
    #[tabled(rename = "Hash")]
    pub hash: String,
}

/// Table row representation for displaying field/column information.
#[derive(Tabled)]
pub struct FieldRow {
    /// Name of the field.
    #[tabled(rename = "Field")]
    pub name: String,
    /// Data type of the field.
    #[tabled(rename = "Type")]
    pub data_type: String,
    /// Whether the field can contain null values.
    #[tabled(rename = "Nullable")]
    pub nullable: String,
}

/// Display pin metadata together with its classification.
pub fn display_pin_info(meta: &Meta, info: &DriverInfo) {
    println!("\nPin: {}", meta.name);
    println!("Title: {}", meta.title);
    if let Some(description) = &meta.description {
        println!("Description: {description}");
    }
    println!("Version: {}", meta.version.version);
    println!("Created: {}", meta.created);
    println!("Files: {}", meta.file.names().join(", "));
    println!("Size: {} bytes", meta.file_size);
    println!("Type: {}", meta.pin_type);
    println!("Hash: {}", meta.pin_hash);

    match info.dtype {
        Some(dtype) => println!("Datatype: {} ({})", dtype.class_name(), info.filetype),
        None => println!("Datatype: generic ({})", info.filetype),
    }

    if !meta.user.is_empty() {
        println!("\n=== Metadata ===");
        for (key, value) in &meta.user {
            println!("{key}: {value}");
        }
    }
}

/// Display the versions of a pin, oldest first.
pub fn display_versions(name: &str, versions: &[VersionMeta]) {
    println!("\nVersions of '{name}' ({} total):\n", versions.len());

    let rows: Vec<VersionRow> = versions
        .iter()
        .map(|v| VersionRow {
            version: v.version.clone(),
            created: v.created.to_rfc3339(),
            hash: v.hash.clone(),
        })
        .collect();

    println!("{}", Table::new(rows));
}

/// Display a value read from a pin.
pub fn display_object(object: &PinObject<PinData>) {
    match object {
        PinObject::GeoTable(table) => display_geo_table(table),
        PinObject::Raster(raster) => display_raster(raster),
        PinObject::Other(PinData::Table(batch)) => {
            println!("\nTable: {} rows", batch.num_rows());
            display_fields(batch);
        }
        PinObject::Other(PinData::Json(json)) => {
            println!(
                "{}",
                serde_json::to_string_pretty(json).unwrap_or_else(|_| json.to_string())
            );
        }
    }
}

fn display_geo_table(table: &GeoTable) {
    println!("\nGeoTable: {} features", table.num_rows());
    println!("Geometry column: {}", table.geometry_column());
    println!("CRS: {}", crs_text(table.crs()));
    display_fields(table.batch());
}

fn display_raster(raster: &RasterGrid) {
    let transform = raster.transform();
    let (min_x, min_y, max_x, max_y) = raster.bounds();

    println!("\nRasterGrid: {} x {} cells", raster.width(), raster.height());
    println!("CRS: {}", crs_text(raster.crs()));
    println!("Origin: ({}, {})", transform.origin_x, transform.origin_y);
    println!("Cell size: {} x {}", transform.cell_width, transform.cell_height);
    println!("Bounds: ({min_x}, {min_y}) - ({max_x}, {max_y})");
    if let Some(nodata) = raster.nodata() {
        println!("NoData: {nodata}");
    }
}

fn display_fields(batch: &RecordBatch) {
    let rows: Vec<FieldRow> = batch
        .schema()
        .fields()
        .iter()
        .map(|f| FieldRow {
            name: f.name().clone(),
            data_type: f.data_type().to_string(),
            nullable: if f.is_nullable() { "Yes" } else { "No" }.to_string(),
        })
        .collect();

    if !rows.is_empty() {
        println!("\n=== Fields ===");
        println!("{}", Table::new(rows));
    }
}

fn crs_text(crs: Option<geopins_core_common::Crs>) -> String {
    crs.map_or_else(|| "N/A".to_string(), |crs| crs.to_string())
}
