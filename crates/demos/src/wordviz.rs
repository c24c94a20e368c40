use crate::Demo;
use glam::Vec3;
use vizlab_common::{Color, GroupId};
use vizlab_panel::{ControlPanel, PanelAction};
use vizlab_scene::{Light, Scene};
use vizlab_textviz::{
    DiameterMode, MarkerPlacer, MarkerShape, RotationMode, TermConfig, WordVizConfig, populate, tokenize,
};

const GREY: Color = Color::rgb(128.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0);

fn light_scene(scene: &mut Scene) {
    scene.background = Some(GREY);
    scene.lights.push(Light::directional(Color::from_hex(0x404040), 100.0));
}

const SENTENCE_VIEW_HEIGHT: f32 = 21.0;

/// A fixed sentence with a cube cloud around every occurrence of three words.
pub struct SentenceViz {
    config: WordVizConfig,
    panel: ControlPanel,
}

impl SentenceViz {
    pub fn new(seed: Option<u64>) -> Self {
        let term = |word: &str, color: u32| TermConfig {
            shape: MarkerShape::Cube,
            size: 0.5,
            count: 100,
            diameter: 10.0,
            diameter_mode: DiameterMode::Fixed,
            rotation: RotationMode::Random,
            ..TermConfig::new(word, Color::from_hex(color))
        };
        Self {
            config: WordVizConfig {
                source_text: "The quick brown fox jumped over the lazy dog.".into(),
                height_factor: 0.6,
                y_offset: -2.0,
                seed: seed.unwrap_or(42),
                terms: vec![term("the", 0xffc0cb), term("lazy", 0xffffff), term("brown", 0xff0000)],
            },
            panel: ControlPanel::new(),
        }
    }
}

impl Demo for SentenceViz {
    fn name(&self) -> &'static str {
        "prototype4"
    }

    fn title(&self) -> &'static str {
        "Sentence Viz"
    }

    fn build(&mut self, scene: &mut Scene) {
        light_scene(scene);
        // Frame the full column: heights run from the y offset up to ~45.
        scene.camera.position = Vec3::new(0.0, SENTENCE_VIEW_HEIGHT, -42.0);
        scene.camera.look_at(Vec3::new(0.0, SENTENCE_VIEW_HEIGHT, 0.0));

        let tokens = tokenize(&self.config.source_text);
        let mut placer = MarkerPlacer::new(self.config.seed, self.config.height_factor, self.config.y_offset);
        for term in &self.config.terms {
            let group = scene.add_group(term.term.clone());
            let markers = placer.place(&tokens, term);
            populate(scene, group, &markers, term);
        }
    }

    fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    fn panel_mut(&mut self) -> &mut ControlPanel {
        &mut self.panel
    }

    fn update(&mut self, _scene: &mut Scene, _elapsed: f32) {}
}

pub(crate) const SOURCE_FOLDER: &str = "Source Text";
pub(crate) const TERMS_FOLDER: &str = "Search Terms";
pub(crate) const VISUALIZE_FOLDER: &str = "Visualize";
pub(crate) const CAMERA_FOLDER: &str = "Camera";

const TURNTABLE_RADIUS: f32 = 27.0;
const TURNTABLE_HEIGHT: f32 = 10.0;
const TURNTABLE_RATE: f32 = 0.1;

/// Interactive word-occurrence visualization.
///
/// The panel walks the user through three stages: edit and save the source
/// text, edit the search terms, then visualize. Once visualized, colour and
/// visibility edits apply to the existing markers and the camera can spin
/// on a turntable.
pub struct WordOccurrenceViz {
    config: WordVizConfig,
    panel: ControlPanel,
    tokens: Vec<String>,
    groups: Vec<GroupId>,
}

impl WordOccurrenceViz {
    pub fn new(config: WordVizConfig) -> Self {
        let mut panel = ControlPanel::new();
        panel
            .add_folder(SOURCE_FOLDER)
            .text("source_text", "SourceText", &config.source_text)
            .button("save_source", "Save");

        let terms = panel.add_folder(TERMS_FOLDER);
        for (i, term) in config.terms.iter().enumerate() {
            terms
                .text(&format!("term{i}"), &format!("Term {}", i + 1), &term.term)
                .color(&format!("term{i}_color"), "Color", term.color)
                .toggle(&format!("term{i}_visible"), "Visible", term.visible);
        }
        panel.add_folder(VISUALIZE_FOLDER).button("visualize", "Visualize");
        panel.add_folder(CAMERA_FOLDER).toggle("turntable", "Turntable", false);

        for title in [TERMS_FOLDER, VISUALIZE_FOLDER, CAMERA_FOLDER] {
            panel.hide_folder(title);
        }

        let tokens = tokenize(&config.source_text);
        Self {
            config,
            panel,
            tokens,
            groups: Vec::new(),
        }
    }

    pub fn config(&self) -> &WordVizConfig {
        &self.config
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    fn save_source(&mut self) {
        if let Some(text) = self.panel.text("source_text") {
            self.config.source_text = text.to_string();
        }
        self.tokens = tokenize(&self.config.source_text);
        tracing::info!(tokens = self.tokens.len(), "saved source text");

        self.panel.hide_folder(SOURCE_FOLDER);
        self.panel.show_folder(TERMS_FOLDER);
        self.panel.show_folder(VISUALIZE_FOLDER);
    }

    fn visualize(&mut self, scene: &mut Scene) {
        let mut placer = MarkerPlacer::new(self.config.seed, self.config.height_factor, self.config.y_offset);
        let mut total = 0;
        for (term, &group) in self.config.terms.iter().zip(&self.groups) {
            let markers = placer.place(&self.tokens, term);
            total += populate(scene, group, &markers, term);
        }
        tracing::info!(markers = total, "visualized search terms");

        self.panel.hide_folder(VISUALIZE_FOLDER);
        self.panel.show_folder(CAMERA_FOLDER);
    }

    /// Pull a changed term field from the panel into the config, updating
    /// already-placed markers where the change is cosmetic.
    fn term_changed(&mut self, scene: &mut Scene, key: &str) {
        let Some(rest) = key.strip_prefix("term") else {
            return;
        };
        let (index, field) = match rest.split_once('_') {
            Some((index, field)) => (index, field),
            None => (rest, ""),
        };
        let Ok(index) = index.parse::<usize>() else {
            return;
        };
        let (Some(term), Some(&group)) = (self.config.terms.get_mut(index), self.groups.get(index)) else {
            return;
        };

        match field {
            "" => {
                if let Some(text) = self.panel.text(key) {
                    term.term = text.trim().to_lowercase();
                }
            }
            "color" => {
                if let Some(color) = self.panel.color(key) {
                    term.color = color;
                    scene.for_each_in_group(group, |node| node.material.set_color(color));
                }
            }
            "visible" => {
                if let Some(visible) = self.panel.toggle(key) {
                    term.visible = visible;
                    scene.set_group_visible(group, visible);
                }
            }
            _ => {}
        }
    }
}

impl Demo for WordOccurrenceViz {
    fn name(&self) -> &'static str {
        "assignment2"
    }

    fn title(&self) -> &'static str {
        "Word Occurrence Viz"
    }

    fn build(&mut self, scene: &mut Scene) {
        light_scene(scene);
        scene.camera.position = Vec3::new(25.0, 15.0, 0.0);
        scene.camera.look_at(Vec3::ZERO);
        self.groups = self
            .config
            .terms
            .iter()
            .map(|term| scene.add_group(term.term.clone()))
            .collect();
    }

    fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    fn panel_mut(&mut self) -> &mut ControlPanel {
        &mut self.panel
    }

    fn update(&mut self, scene: &mut Scene, elapsed: f32) {
        for action in self.panel.drain_actions() {
            match action {
                PanelAction::Pressed(key) if key == "save_source" => self.save_source(),
                PanelAction::Pressed(key) if key == "visualize" => self.visualize(scene),
                PanelAction::Changed(key) => self.term_changed(scene, &key),
                PanelAction::Pressed(_) => {}
            }
        }

        if self.panel.toggle("turntable").unwrap_or(false) {
            let angle = elapsed * TURNTABLE_RATE;
            scene.camera.position = Vec3::new(
                angle.sin() * TURNTABLE_RADIUS,
                TURNTABLE_HEIGHT,
                angle.cos() * TURNTABLE_RADIUS,
            );
            scene.camera.look_at(Vec3::ZERO);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "The shire. The fellowship left the shire for mordor.";

    fn built() -> (WordOccurrenceViz, Scene) {
        let mut demo = WordOccurrenceViz::new(WordVizConfig::default());
        let mut scene = Scene::new();
        demo.build(&mut scene);
        (demo, scene)
    }

    fn visible_folders(demo: &WordOccurrenceViz) -> Vec<&str> {
        demo.panel()
            .folders()
            .iter()
            .filter(|f| f.visible)
            .map(|f| f.title.as_str())
            .collect()
    }

    fn save_and_visualize(demo: &mut WordOccurrenceViz, scene: &mut Scene) {
        demo.panel_mut().set_text("source_text", TEXT);
        demo.panel_mut().press("save_source");
        demo.update(scene, 0.0);
        demo.panel_mut().press("visualize");
        demo.update(scene, 0.0);
    }

    #[test]
    fn sentence_viz_places_every_term() {
        let mut demo = SentenceViz::new(None);
        let mut scene = Scene::new();
        demo.build(&mut scene);
        // "the" twice, "lazy" and "brown" once each.
        assert_eq!(scene.node_count(), 400);
        assert_eq!(scene.groups().len(), 3);
    }

    #[test]
    fn sentence_viz_frames_every_marker() {
        let mut demo = SentenceViz::new(None);
        let mut scene = Scene::new();
        demo.build(&mut scene);
        let view_proj = scene.camera.view_projection(16.0 / 9.0);
        for node in scene.nodes().values() {
            let clip = view_proj * node.transform.position.extend(1.0);
            assert!(clip.w > 0.0);
            assert!((clip.y / clip.w).abs() <= 1.0, "{} at {}", node.name, node.transform.position);
        }
    }

    #[test]
    fn sentence_viz_is_reproducible_per_seed() {
        let hash = |seed| {
            let mut demo = SentenceViz::new(seed);
            let mut scene = Scene::new();
            demo.build(&mut scene);
            scene.state_hash()
        };
        assert_eq!(hash(Some(7)), hash(Some(7)));
        assert_ne!(hash(Some(7)), hash(Some(8)));
    }

    #[test]
    fn starts_with_source_text_stage() {
        let (demo, scene) = built();
        assert_eq!(visible_folders(&demo), vec![SOURCE_FOLDER]);
        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.groups().len(), 3);
        assert_eq!(demo.tokens(), ["here", "is", "my", "source", "text"]);
    }

    #[test]
    fn save_advances_to_term_stage() {
        let (mut demo, mut scene) = built();
        demo.panel_mut().set_text("source_text", TEXT);
        demo.panel_mut().press("save_source");
        demo.update(&mut scene, 0.0);

        assert_eq!(visible_folders(&demo), vec![TERMS_FOLDER, VISUALIZE_FOLDER]);
        assert_eq!(demo.config().source_text, TEXT);
        assert_eq!(demo.tokens()[1], "shire");
    }

    #[test]
    fn visualize_builds_markers_and_unlocks_camera() {
        let (mut demo, mut scene) = built();
        save_and_visualize(&mut demo, &mut scene);

        // shire x2 at 100, mordor x1 at 80, fellowship x1 at 50.
        assert_eq!(scene.node_count(), 330);
        assert_eq!(visible_folders(&demo), vec![TERMS_FOLDER, CAMERA_FOLDER]);
    }

    #[test]
    fn visualizing_twice_replaces_markers() {
        let (mut demo, mut scene) = built();
        save_and_visualize(&mut demo, &mut scene);
        let first = scene.node_count();

        demo.panel_mut().show_folder(VISUALIZE_FOLDER);
        demo.panel_mut().press("visualize");
        demo.update(&mut scene, 1.0);
        assert_eq!(scene.node_count(), first);
    }

    #[test]
    fn colour_and_visibility_apply_live() {
        let (mut demo, mut scene) = built();
        save_and_visualize(&mut demo, &mut scene);
        let shire = demo.groups[0];

        let pink = Color::from_hex(0xff00ff);
        demo.panel_mut().set_color("term0_color", pink);
        demo.panel_mut().set_toggle("term0_visible", false);
        demo.update(&mut scene, 0.0);

        assert!(scene.nodes_in_group(shire).all(|(_, n)| n.material.color() == Some(pink)));
        assert!(!scene.group(shire).unwrap().visible);
        assert_eq!(scene.visible_nodes().count(), 130);
    }

    #[test]
    fn edited_term_used_on_next_visualize() {
        let (mut demo, mut scene) = built();
        demo.panel_mut().set_text("source_text", TEXT);
        demo.panel_mut().press("save_source");
        demo.update(&mut scene, 0.0);

        demo.panel_mut().set_text("term2", "Left");
        demo.panel_mut().press("visualize");
        demo.update(&mut scene, 0.0);

        assert_eq!(demo.config().terms[2].term, "left");
        assert_eq!(scene.nodes_in_group(demo.groups[2]).count(), 50);
    }

    #[test]
    fn blank_term_places_no_markers() {
        let (mut demo, mut scene) = built();
        demo.panel_mut().set_text("source_text", "Hello world!");
        demo.panel_mut().press("save_source");
        demo.update(&mut scene, 0.0);
        assert_eq!(demo.tokens(), ["hello", "world", ""]);

        demo.panel_mut().set_text("term0", "   ");
        demo.panel_mut().press("visualize");
        demo.update(&mut scene, 0.0);

        assert_eq!(demo.config().terms[0].term, "");
        assert_eq!(scene.nodes_in_group(demo.groups[0]).count(), 0);
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn turntable_circles_the_origin() {
        let (mut demo, mut scene) = built();
        demo.update(&mut scene, 5.0);
        assert_eq!(scene.camera.position, Vec3::new(25.0, 15.0, 0.0));

        demo.panel_mut().set_toggle("turntable", true);
        let t = 12.0_f32;
        demo.update(&mut scene, t);
        let p = scene.camera.position;
        assert!((p.x - (0.1 * t).sin() * 27.0).abs() < 1e-4);
        assert!((p.z - (0.1 * t).cos() * 27.0).abs() < 1e-4);
        assert_eq!(p.y, 10.0);
        assert_eq!(scene.camera.target, Vec3::ZERO);
    }
}
