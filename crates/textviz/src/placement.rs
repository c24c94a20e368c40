use crate::config::{MAX_MARKERS_PER_OCCURRENCE, RotationMode, TermConfig};
use crate::tokenize::locate;
use glam::Vec3;
use serde::Serialize;
use std::f32::consts::TAU;
use vizlab_common::{GroupId, Transform};
use vizlab_scene::{Material, Node, Scene};

/// One generated marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    /// Token index of the occurrence this marker belongs to.
    pub token_index: usize,
    /// Height derived from the token position, before the y offset.
    pub height: f32,
    pub transform: Transform,
}

/// Seeded generator for marker clusters.
///
/// Two placers built with the same seed, height factor and offset produce
/// identical markers for identical inputs.
pub struct MarkerPlacer {
    rng: fastrand::Rng,
    height_factor: f32,
    y_offset: f32,
}

impl MarkerPlacer {
    pub fn new(seed: u64, height_factor: f32, y_offset: f32) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
            height_factor,
            y_offset,
        }
    }

    pub fn height_factor(&self) -> f32 {
        self.height_factor
    }

    /// Emit `term.count` markers for every occurrence of `term.term` in `tokens`.
    pub fn place(&mut self, tokens: &[String], term: &TermConfig) -> Vec<Marker> {
        let _span = tracing::debug_span!("place_markers", term = %term.term).entered();
        let found = locate(tokens, &term.term, self.height_factor);

        let total = found.len().saturating_mul(term.count);
        let mut markers = Vec::with_capacity(total.min(MAX_MARKERS_PER_OCCURRENCE));
        for occurrence in &found {
            for _ in 0..term.count {
                markers.push(self.marker(occurrence.index, occurrence.height, term));
            }
        }

        tracing::debug!(
            occurrences = found.len(),
            markers = markers.len(),
            "placed markers"
        );
        markers
    }

    fn marker(&mut self, token_index: usize, height: f32, term: &TermConfig) -> Marker {
        let diameter = term.diameter_mode.diameter(term.diameter, height);
        let x = (self.rng.f32() - 0.5) * diameter;
        let z = (self.rng.f32() - 0.5) * diameter;

        let mut transform =
            Transform::from_position(Vec3::new(x, height + self.y_offset, z)).with_uniform_scale(term.scale);

        match term.rotation {
            RotationMode::None => {}
            RotationMode::Random => {
                let rx = self.rng.f32() * TAU;
                let ry = self.rng.f32() * TAU;
                let rz = self.rng.f32() * TAU;
                transform = transform.with_euler(rx, ry, rz);
            }
            RotationMode::FaceCenter => transform.look_at(Vec3::new(0.0, height, 0.0)),
        }

        Marker {
            token_index,
            height,
            transform,
        }
    }
}

/// Replace the contents of `group` with one mesh node per marker.
///
/// Returns the number of nodes added. The group's visibility follows
/// `term.visible`.
pub fn populate(scene: &mut Scene, group: GroupId, markers: &[Marker], term: &TermConfig) -> usize {
    scene.clear_group(group);
    scene.set_group_visible(group, term.visible);

    let geometry = term.shape.geometry(term.size);
    let mut material = Material::standard(term.color);
    material.set_wireframe(term.wireframe);

    for marker in markers {
        scene.add_node(
            Node::new(term.term.clone(), geometry, material)
                .with_transform(marker.transform)
                .in_group(group),
        );
    }
    tracing::info!(term = %term.term, nodes = markers.len(), "populated marker group");
    markers.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DiameterMode, MarkerShape};
    use crate::tokenize::{placement_height, tokenize};
    use vizlab_common::Color;
    use vizlab_scene::Geometry;

    fn term(word: &str) -> TermConfig {
        TermConfig {
            count: 10,
            ..TermConfig::new(word, Color::WHITE)
        }
    }

    #[test]
    fn absent_term_places_nothing() {
        let tokens = tokenize("Here is my source text.");
        let mut placer = MarkerPlacer::new(1, 0.2, -5.0);
        assert!(placer.place(&tokens, &term("mordor")).is_empty());
    }

    #[test]
    fn huge_count_does_not_overflow_capacity() {
        let tokens = tokenize("ring ring ring");
        let mut placer = MarkerPlacer::new(1, 0.2, -5.0);
        let huge = TermConfig {
            count: usize::MAX,
            ..TermConfig::new("mordor", Color::WHITE)
        };
        assert!(placer.place(&tokens, &huge).is_empty());
    }

    #[test]
    fn blank_term_matches_no_edge_tokens() {
        let tokens = tokenize("Hello world!");
        assert_eq!(tokens.last().map(String::as_str), Some(""));
        let mut placer = MarkerPlacer::new(1, 0.2, -5.0);
        assert!(placer.place(&tokens, &term("")).is_empty());
    }

    #[test]
    fn count_markers_per_occurrence() {
        let tokens = tokenize("The quick brown fox jumped over the lazy dog.");
        let mut placer = MarkerPlacer::new(1, 0.2, -2.0);
        let markers = placer.place(&tokens, &term("the"));
        assert_eq!(markers.len(), 20);
        assert!(markers[..10].iter().all(|m| m.token_index == 0));
        assert!(markers[10..].iter().all(|m| m.token_index == 6));
    }

    #[test]
    fn marker_height_and_offset() {
        let tokens = tokenize("The quick brown fox jumped over the lazy dog.");
        let mut placer = MarkerPlacer::new(3, 0.6, -2.0);
        let markers = placer.place(&tokens, &term("lazy"));
        let expected = placement_height(7, 9, 0.6);
        for m in &markers {
            assert_eq!(m.height, expected);
            assert_eq!(m.transform.position.y, expected - 2.0);
        }
    }

    #[test]
    fn markers_stay_within_diameter() {
        let tokens = tokenize("a b c d e f g h i j");
        let cfg = TermConfig {
            diameter: 8.0,
            diameter_mode: DiameterMode::Widening,
            count: 200,
            ..term("j")
        };
        let mut placer = MarkerPlacer::new(9, 0.2, 0.0);
        let markers = placer.place(&tokens, &cfg);
        let height = placement_height(9, 10, 0.2);
        let half = (8.0 + height * 0.4) / 2.0;
        for m in &markers {
            assert!(m.transform.position.x.abs() <= half);
            assert!(m.transform.position.z.abs() <= half);
        }
    }

    #[test]
    fn same_seed_same_markers() {
        let tokens = tokenize("shire and shire and mordor");
        let cfg = term("shire");
        let a = MarkerPlacer::new(42, 0.2, -5.0).place(&tokens, &cfg);
        let b = MarkerPlacer::new(42, 0.2, -5.0).place(&tokens, &cfg);
        let c = MarkerPlacer::new(43, 0.2, -5.0).place(&tokens, &cfg);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn rotation_modes() {
        let tokens = tokenize("x y z");
        let mut placer = MarkerPlacer::new(5, 0.2, -5.0);

        let none = placer.place(
            &tokens,
            &TermConfig {
                rotation: RotationMode::None,
                ..term("y")
            },
        );
        assert!(none.iter().all(|m| m.transform.rotation == glam::Quat::IDENTITY));

        let facing = placer.place(
            &tokens,
            &TermConfig {
                rotation: RotationMode::FaceCenter,
                ..term("y")
            },
        );
        for m in &facing {
            let target = Vec3::new(0.0, m.height, 0.0);
            let to_target = (target - m.transform.position).normalize();
            let forward = m.transform.rotation * Vec3::Z;
            assert!(forward.abs_diff_eq(to_target, 1e-4));
        }
    }

    #[test]
    fn scale_is_uniform() {
        let tokens = tokenize("one");
        let cfg = TermConfig {
            scale: 1.5,
            ..term("one")
        };
        let markers = MarkerPlacer::new(0, 0.2, 0.0).place(&tokens, &cfg);
        assert!(markers.iter().all(|m| m.transform.scale == Vec3::splat(1.5)));
    }

    #[test]
    fn populate_replaces_group_contents() {
        let tokens = tokenize("shire shire");
        let cfg = TermConfig {
            shape: MarkerShape::Sphere,
            wireframe: true,
            ..term("shire")
        };
        let mut scene = Scene::new();
        let group = scene.add_group("shire");
        let mut placer = MarkerPlacer::new(7, 0.2, -5.0);

        let markers = placer.place(&tokens, &cfg);
        assert_eq!(populate(&mut scene, group, &markers, &cfg), 20);
        // A second visualize pass must not stack on top of the first.
        let markers = placer.place(&tokens, &cfg);
        populate(&mut scene, group, &markers, &cfg);
        assert_eq!(scene.nodes_in_group(group).count(), 20);

        let (_, node) = scene.nodes_in_group(group).next().unwrap();
        assert!(matches!(node.geometry, Geometry::Sphere { width_segments: 7, height_segments: 4, .. }));
        assert!(node.material.wireframe());
    }

    #[test]
    fn populate_respects_visibility() {
        let tokens = tokenize("ring");
        let cfg = TermConfig {
            visible: false,
            ..term("ring")
        };
        let mut scene = Scene::new();
        let group = scene.add_group("ring");
        let markers = MarkerPlacer::new(1, 0.2, 0.0).place(&tokens, &cfg);
        populate(&mut scene, group, &markers, &cfg);
        assert_eq!(scene.node_count(), 10);
        assert_eq!(scene.visible_nodes().count(), 0);
    }
}
