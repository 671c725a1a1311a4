//! Verification conditions checked against the final grid

use grainfall_core::Grid;
use grainfall_core::simulation::MaterialId;
use serde::{Deserialize, Serialize};

use super::actions::Region;

/// Conditions that can be verified against grid state. Materials are
/// referenced by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VerificationCondition {
    // === MATERIAL CHECKS ===
    /// Assert exact material count (whole grid unless a region is given)
    MaterialCount {
        material: String,
        expected: usize,
        #[serde(default)]
        tolerance: Option<usize>, // Allow ±N variance
        #[serde(default)]
        region: Option<Region>,
    },

    /// Assert material count within an inclusive range
    MaterialCountRange {
        material: String,
        min: usize,
        max: usize,
        #[serde(default)]
        region: Option<Region>,
    },

    /// Assert the material at one cell
    MaterialAt { x: i32, y: i32, expected: String },

    /// Assert the cell holds one of several materials
    MaterialAtAny {
        x: i32,
        y: i32,
        expected: Vec<String>,
    },

    /// Assert no material in region (all air)
    RegionEmpty { region: Region },

    /// Assert the number of non-air cells
    NonAirCount { min: usize, max: usize },

    // === LOGICAL OPERATORS ===
    /// All conditions must pass
    All {
        conditions: Vec<VerificationCondition>,
    },

    /// Any condition must pass
    Any {
        conditions: Vec<VerificationCondition>,
    },

    /// Condition must NOT pass
    Not {
        condition: Box<VerificationCondition>,
    },
}

/// Result of a verification check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub passed: bool,
    pub message: String,
    pub actual_value: Option<String>, // For debugging
}

impl VerificationResult {
    fn failed(message: String) -> Self {
        Self {
            passed: false,
            message,
            actual_value: None,
        }
    }
}

impl VerificationCondition {
    /// Evaluate condition against grid state
    ///
    /// Unknown material names fail the check rather than aborting the run.
    pub fn evaluate(&self, grid: &Grid) -> VerificationResult {
        match self {
            VerificationCondition::MaterialCount {
                material,
                expected,
                tolerance,
                region,
            } => {
                let id = match material_id(grid, material) {
                    Ok(id) => id,
                    Err(result) => return result,
                };
                let actual = count_material(grid, id, region.as_ref());
                let tol = tolerance.unwrap_or(0);
                let passed = actual >= expected.saturating_sub(tol) && actual <= expected + tol;

                VerificationResult {
                    passed,
                    message: format!(
                        "{} count in {}: expected {}±{}, got {}",
                        material,
                        describe(region.as_ref()),
                        expected,
                        tol,
                        actual
                    ),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::MaterialCountRange {
                material,
                min,
                max,
                region,
            } => {
                let id = match material_id(grid, material) {
                    Ok(id) => id,
                    Err(result) => return result,
                };
                let actual = count_material(grid, id, region.as_ref());
                let passed = actual >= *min && actual <= *max;

                VerificationResult {
                    passed,
                    message: format!(
                        "{} count in {}: expected {}-{}, got {}",
                        material,
                        describe(region.as_ref()),
                        min,
                        max,
                        actual
                    ),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::MaterialAt { x, y, expected } => {
                let id = match material_id(grid, expected) {
                    Ok(id) => id,
                    Err(result) => return result,
                };
                let actual = grid.material_at(*x, *y);
                let actual_name = material_name(grid, actual);

                VerificationResult {
                    passed: actual == Some(id),
                    message: format!(
                        "Material at ({}, {}): expected {}, got {}",
                        x, y, expected, actual_name
                    ),
                    actual_value: Some(actual_name),
                }
            }

            VerificationCondition::MaterialAtAny { x, y, expected } => {
                let mut ids = Vec::with_capacity(expected.len());
                for name in expected {
                    match material_id(grid, name) {
                        Ok(id) => ids.push(id),
                        Err(result) => return result,
                    }
                }
                let actual = grid.material_at(*x, *y);
                let actual_name = material_name(grid, actual);
                let passed = actual.is_some_and(|id| ids.contains(&id));

                VerificationResult {
                    passed,
                    message: format!(
                        "Material at ({}, {}): expected one of [{}], got {}",
                        x,
                        y,
                        expected.join(", "),
                        actual_name
                    ),
                    actual_value: Some(actual_name),
                }
            }

            VerificationCondition::RegionEmpty { region } => {
                let positions = region.positions(grid.width(), grid.height());
                let total = positions.len();
                let air_count = positions
                    .iter()
                    .filter(|pos| grid.material_at(pos.x, pos.y) == Some(MaterialId::AIR))
                    .count();

                VerificationResult {
                    passed: air_count == total,
                    message: format!(
                        "Region {:?} empty: {} air / {} total cells",
                        region, air_count, total
                    ),
                    actual_value: Some(format!("{}/{}", air_count, total)),
                }
            }

            VerificationCondition::NonAirCount { min, max } => {
                let actual = grid.non_air_count();

                VerificationResult {
                    passed: actual >= *min && actual <= *max,
                    message: format!("Non-air cells: expected {}-{}, got {}", min, max, actual),
                    actual_value: Some(actual.to_string()),
                }
            }

            VerificationCondition::All { conditions } => {
                let mut all_passed = true;
                let mut messages = Vec::new();

                for cond in conditions {
                    let result = cond.evaluate(grid);
                    if !result.passed {
                        all_passed = false;
                    }
                    messages.push(format!("  - {}", result.message));
                }

                VerificationResult {
                    passed: all_passed,
                    message: format!("All conditions:\n{}", messages.join("\n")),
                    actual_value: None,
                }
            }

            VerificationCondition::Any { conditions } => {
                let mut any_passed = false;
                let mut messages = Vec::new();

                for cond in conditions {
                    let result = cond.evaluate(grid);
                    if result.passed {
                        any_passed = true;
                    }
                    messages.push(format!("  - {}", result.message));
                }

                VerificationResult {
                    passed: any_passed,
                    message: format!("Any condition:\n{}", messages.join("\n")),
                    actual_value: None,
                }
            }

            VerificationCondition::Not { condition } => {
                let result = condition.evaluate(grid);
                VerificationResult {
                    passed: !result.passed,
                    message: format!("NOT ({})", result.message),
                    actual_value: result.actual_value,
                }
            }
        }
    }
}

// Helper functions

fn material_id(grid: &Grid, name: &str) -> Result<u16, VerificationResult> {
    grid.materials()
        .find_by_name(name)
        .map(|def| def.id)
        .map_err(|e| VerificationResult::failed(e.to_string()))
}

fn material_name(grid: &Grid, id: Option<u16>) -> String {
    match id {
        Some(id) => grid.materials().get(id).name.clone(),
        None => "out of bounds".to_string(),
    }
}

fn count_material(grid: &Grid, material: u16, region: Option<&Region>) -> usize {
    match region {
        None | Some(Region::Whole) => grid.count(material),
        Some(region) => region
            .positions(grid.width(), grid.height())
            .into_iter()
            .filter(|pos| grid.material_at(pos.x, pos.y) == Some(material))
            .count(),
    }
}

fn describe(region: Option<&Region>) -> String {
    match region {
        Some(region) => format!("{:?}", region),
        None => "grid".to_string(),
    }
}
