// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layout configuration: spacing and insets.

use kurbo::Insets;

use crate::LayoutError;

/// Spacing and inset parameters for a grid layout.
///
/// The default configuration has no spacing and no insets, so items are packed
/// edge to edge starting at the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayoutConfig {
    /// Horizontal gap between two adjacent items in the same row.
    pub item_spacing: f64,
    /// Vertical gap between two consecutive rows.
    pub line_spacing: f64,
    /// Space reserved around the packed content.
    ///
    /// `x0`/`x1` shrink the usable row width; `y0` offsets the first row and
    /// `y1` is added below the last one.
    pub insets: Insets,
}

impl Default for GridLayoutConfig {
    fn default() -> Self {
        Self {
            item_spacing: 0.0,
            line_spacing: 0.0,
            insets: Insets::ZERO,
        }
    }
}

impl GridLayoutConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the horizontal gap between items. Negative values clamp to zero.
    pub fn with_item_spacing(mut self, spacing: f64) -> Self {
        self.item_spacing = spacing.max(0.0);
        self
    }

    /// Set the vertical gap between rows. Negative values clamp to zero.
    pub fn with_line_spacing(mut self, spacing: f64) -> Self {
        self.line_spacing = spacing.max(0.0);
        self
    }

    /// Set the content insets.
    pub fn with_insets(mut self, insets: Insets) -> Self {
        self.insets = insets;
        self
    }

    /// Width left for items once the horizontal insets are removed.
    #[must_use]
    pub fn usable_width(&self, container_width: f64) -> f64 {
        container_width - self.insets.x0 - self.insets.x1
    }

    /// Check that a container `container_width` wide can hold a layout.
    ///
    /// The width must be positive and finite, and the horizontal insets must
    /// leave some usable width. Fails with [`LayoutError::InvalidLayoutBounds`]
    /// otherwise.
    pub fn validate_width(&self, container_width: f64) -> Result<(), LayoutError> {
        let usable = self.usable_width(container_width);
        if !container_width.is_finite() || container_width <= 0.0 || usable.is_nan() || usable <= 0.0
        {
            return Err(LayoutError::InvalidLayoutBounds {
                width: container_width,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::GridLayoutConfig;
    use crate::LayoutError;
    use kurbo::Insets;

    #[test]
    fn builder_clamps_negative_spacing() {
        let config = GridLayoutConfig::new()
            .with_item_spacing(-4.0)
            .with_line_spacing(6.0);
        assert_eq!(config.item_spacing, 0.0);
        assert_eq!(config.line_spacing, 6.0);
    }

    #[test]
    fn usable_width_subtracts_horizontal_insets() {
        let config = GridLayoutConfig::new().with_insets(Insets::new(10.0, 5.0, 20.0, 5.0));
        assert_eq!(config.usable_width(300.0), 270.0);
        assert_eq!(GridLayoutConfig::default().usable_width(300.0), 300.0);
    }

    #[test]
    fn width_validation() {
        let config = GridLayoutConfig::new().with_insets(Insets::new(40.0, 0.0, 40.0, 0.0));
        assert_eq!(config.validate_width(100.0), Ok(()));
        assert_eq!(
            config.validate_width(80.0),
            Err(LayoutError::InvalidLayoutBounds { width: 80.0 })
        );
        for width in [0.0, -1.0, f64::INFINITY] {
            assert!(
                GridLayoutConfig::default().validate_width(width).is_err(),
                "width {width} must be rejected"
            );
        }
    }
}
