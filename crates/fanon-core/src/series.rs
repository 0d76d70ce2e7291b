//! Series — the franchise sub-settings characters and lore belong to.

use serde::{Deserialize, Serialize};

/// A sub-series of the franchise. `color_code` drives display colouring
/// wherever the series is embedded in a read model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
  pub id:          i64,
  pub name:        String,
  pub description: Option<String>,
  /// Free text, the franchise uses stylised years ("20XX").
  pub start_year:  Option<String>,
  pub end_year:    Option<String>,
  pub color_code:  String,
}

#[derive(Debug, Clone)]
pub struct NewSeries {
  pub name:        String,
  pub description: Option<String>,
  pub start_year:  Option<String>,
  pub end_year:    Option<String>,
  pub color_code:  String,
}
