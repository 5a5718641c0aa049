use glam::{Mat4, Vec3};

// ============================================================================
// BoundingBox
// ============================================================================

/// Axis-aligned box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Componentwise min/max over `points`. An empty set gives a zero-sized
    /// box at the origin.
    #[must_use]
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some((&first, rest)) = points.split_first() else {
            return Self::default();
        };
        rest.iter().fold(Self::new(first, first), |b, &p| Self {
            min: b.min.min(p),
            max: b.max.max(p),
        })
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[must_use]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Box around the eight transformed corners.
    #[must_use]
    pub fn transform(&self, matrix: &Mat4) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut new_min = Vec3::splat(f32::INFINITY);
        let mut new_max = Vec3::splat(f32::NEG_INFINITY);

        for point in corners {
            let transformed = matrix.transform_point3(point);
            new_min = new_min.min(transformed);
            new_max = new_max.max(transformed);
        }

        Self { min: new_min, max: new_max }
    }
}

// ============================================================================
// BoundingSphere
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    #[must_use]
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Ritter's approximate bounding sphere.
    ///
    /// Seeds the sphere on an approximate diameter (farthest point from the
    /// first point, then farthest from that), then grows it over one pass
    /// for every point left outside. Not minimal. An empty set gives a zero
    /// sphere at the origin.
    #[must_use]
    pub fn ritter(points: &[Vec3]) -> Self {
        let Some(&first) = points.first() else {
            return Self::default();
        };

        let p1 = farthest_from(first, points);
        let p2 = farthest_from(p1, points);

        let mut center = (p1 + p2) * 0.5;
        let mut radius = p1.distance(p2) * 0.5;
        let mut radius_sq = radius * radius;

        for &point in points {
            let offset = point - center;
            let dist_sq = offset.length_squared();
            if dist_sq <= radius_sq {
                continue;
            }

            let dist = dist_sq.sqrt();
            // Too close to the center to give a direction.
            if dist <= f32::EPSILON {
                continue;
            }

            radius = (radius + dist) * 0.5;
            center += offset * ((dist - radius) / dist);
            radius_sq = radius * radius;
        }

        Self { center, radius }
    }

    /// Sphere at the centroid of `points`, radius to the farthest point.
    #[must_use]
    pub fn from_centroid(points: &[Vec3]) -> Self {
        if points.is_empty() {
            return Self::default();
        }
        let center = points.iter().copied().sum::<Vec3>() / points.len() as f32;
        let radius_sq = points
            .iter()
            .map(|p| p.distance_squared(center))
            .fold(0.0_f32, f32::max);
        Self {
            center,
            radius: radius_sq.sqrt(),
        }
    }

    #[must_use]
    pub fn contains(&self, point: Vec3, tolerance: f32) -> bool {
        point.distance(self.center) <= self.radius + tolerance
    }
}

fn farthest_from(origin: Vec3, points: &[Vec3]) -> Vec3 {
    let mut best = origin;
    let mut best_dist_sq = 0.0;
    for &point in points {
        let dist_sq = origin.distance_squared(point);
        if dist_sq > best_dist_sq {
            best_dist_sq = dist_sq;
            best = point;
        }
    }
    best
}
