// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Walls and their footprints.
//!
//! A wall is defined by its axis from start to end point, a thickness, and
//! an optional arc extent. Looking from start to end, the left side is the
//! side the axis' left normal points to. Arc walls bend around a center
//! computed from the chord and the signed extent: a positive extent sweeps
//! counter-clockwise, which puts the center on the left of the chord.

use std::f64::consts::PI;

use nalgebra::{Point2, Vector2};

use crate::keys::ObjectKey;

/// Maximum angle covered by one segment when sampling arc walls
const ARC_STEP: f64 = PI / 24.0;

/// Arc extents below this are treated as straight walls
const MIN_ARC_EXTENT: f64 = 1e-6;

const MIN_LENGTH: f64 = 1e-9;

/// A wall of the home
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub x_start: f64,
    pub y_start: f64,
    pub x_end: f64,
    pub y_end: f64,
    pub thickness: f64,
    /// Height at the start point
    pub height: f64,
    /// Height at the end point for sloping walls
    pub height_at_end: Option<f64>,
    /// Signed arc extent in radians, `None` for a straight wall
    pub arc_extent: Option<f64>,
    pub left_side_color: Option<u32>,
    pub right_side_color: Option<u32>,
    pub level: Option<ObjectKey>,
}

/// The six faces a wall node is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WallPart {
    LeftSide,
    RightSide,
    StartCap,
    EndCap,
    Top,
    Bottom,
}

impl WallPart {
    pub const ALL: [WallPart; 6] = [
        WallPart::LeftSide,
        WallPart::RightSide,
        WallPart::StartCap,
        WallPart::EndCap,
        WallPart::Top,
        WallPart::Bottom,
    ];
}

impl Wall {
    pub fn new(
        x_start: f64,
        y_start: f64,
        x_end: f64,
        y_end: f64,
        thickness: f64,
        height: f64,
    ) -> Self {
        Self {
            x_start,
            y_start,
            x_end,
            y_end,
            thickness,
            height,
            height_at_end: None,
            arc_extent: None,
            left_side_color: None,
            right_side_color: None,
            level: None,
        }
    }

    pub fn start(&self) -> Point2<f64> {
        Point2::new(self.x_start, self.y_start)
    }

    pub fn end(&self) -> Point2<f64> {
        Point2::new(self.x_end, self.y_end)
    }

    /// Distance between start and end points
    pub fn length(&self) -> f64 {
        (self.end() - self.start()).norm()
    }

    /// Height at the end point, equal to `height` unless the wall slopes
    pub fn end_height(&self) -> f64 {
        self.height_at_end.unwrap_or(self.height)
    }

    pub fn max_height(&self) -> f64 {
        self.height.max(self.end_height())
    }

    pub fn is_trapezoidal(&self) -> bool {
        self.height_at_end.is_some_and(|h| h != self.height)
    }

    /// Unit left normal of the chord
    fn left_normal(&self) -> Vector2<f64> {
        let chord = self.end() - self.start();
        let length = chord.norm();
        if length < MIN_LENGTH {
            return Vector2::new(0.0, 1.0);
        }
        Vector2::new(-chord.y, chord.x) / length
    }

    fn effective_arc(&self) -> Option<f64> {
        self.arc_extent
            .filter(|a| a.abs() > MIN_ARC_EXTENT && self.length() > MIN_LENGTH)
    }

    /// Center and radius of the axis circle for arc walls
    pub fn arc_circle(&self) -> Option<(Point2<f64>, f64)> {
        let extent = self.effective_arc()?;
        let chord = self.length();
        let middle = Point2::from((self.start().coords + self.end().coords) / 2.0);
        let center = middle + self.left_normal() * (chord / 2.0 / (extent / 2.0).tan());
        let radius = chord / (2.0 * (extent.abs() / 2.0).sin());
        Some((center, radius))
    }

    /// Left and right side polylines from start to end for a given thickness
    pub fn side_points_with_thickness(
        &self,
        thickness: f64,
    ) -> (Vec<Point2<f64>>, Vec<Point2<f64>>) {
        let half = thickness / 2.0;
        match (self.effective_arc(), self.arc_circle()) {
            (Some(extent), Some((center, radius))) => {
                let start_angle =
                    (self.y_start - center.y).atan2(self.x_start - center.x);
                let segments = ((extent.abs() / ARC_STEP).ceil() as usize).max(2);
                // Sweeping counter-clockwise puts the center on the left
                let left_radius = radius - extent.signum() * half;
                let right_radius = radius + extent.signum() * half;

                let mut left = Vec::with_capacity(segments + 1);
                let mut right = Vec::with_capacity(segments + 1);
                for i in 0..=segments {
                    let angle = start_angle + extent * i as f64 / segments as f64;
                    let (sin, cos) = angle.sin_cos();
                    left.push(Point2::new(
                        center.x + left_radius * cos,
                        center.y + left_radius * sin,
                    ));
                    right.push(Point2::new(
                        center.x + right_radius * cos,
                        center.y + right_radius * sin,
                    ));
                }
                (left, right)
            }
            _ => {
                let offset = self.left_normal() * half;
                (
                    vec![self.start() + offset, self.end() + offset],
                    vec![self.start() - offset, self.end() - offset],
                )
            }
        }
    }

    pub fn side_points(&self) -> (Vec<Point2<f64>>, Vec<Point2<f64>>) {
        self.side_points_with_thickness(self.thickness)
    }

    /// Closed footprint: left side from start to end, then right side back.
    pub fn points(&self) -> Vec<Point2<f64>> {
        self.points_with_thickness(self.thickness)
    }

    /// Footprint the wall would have with another thickness.
    pub fn points_with_thickness(&self, thickness: f64) -> Vec<Point2<f64>> {
        let (mut left, right) = self.side_points_with_thickness(thickness);
        left.extend(right.into_iter().rev());
        left
    }

    /// Points bounding one face of the wall in the floor plane
    pub fn part_points(&self, part: WallPart) -> Vec<Point2<f64>> {
        let (left, right) = self.side_points();
        match part {
            WallPart::LeftSide => left,
            WallPart::RightSide => right,
            WallPart::StartCap => vec![left[0], right[0]],
            WallPart::EndCap => vec![left[left.len() - 1], right[right.len() - 1]],
            WallPart::Top | WallPart::Bottom => self.points(),
        }
    }

    /// Height at a fraction of the way from start to end
    pub fn height_at(&self, fraction: f64) -> f64 {
        self.height + (self.end_height() - self.height) * fraction.clamp(0.0, 1.0)
    }
}
