//! The interaction controller.
//!
//! [`Canvas`] turns pointer samples into committed scene mutations. It owns
//! the scene, the command stack, the guide, the touch classifier and the
//! view, and reports back through [`CanvasEvent`]s.

use crate::bounds::{CanvasBounds, Side};
use crate::camera::{Camera, ZOOM_STEP};
use crate::error::CanvasError;
use crate::eraser::{EraseSession, Eraser};
use crate::events::{CanvasEvent, SHORT_STATUS_DURATION_MS, STATUS_DURATION_MS};
use crate::guide::{Guide, GuideHandle};
use crate::history::{AddItem, Command, CommandStack, MoveItems, RemoveItem, ScaleItems};
use crate::input::{GestureEvent, InputState, PointerEvent, PointerSample, SourceId};
use crate::item::{ItemId, ItemKind, PaperKind, PathItem, graph_paper, lined_paper};
use crate::scene::Scene;
use crate::settings::BoardSettings;
use crate::style::{Palette, PenColor};
use crate::tools::{Mode, Status, Tool, ToolBuilder, ToolRegistry};
use crate::touch::{ContactClass, TouchClassifier, point_size};
use kurbo::{Point, Rect, Size, Vec2};

const COPIED_MESSAGE: &str = "The elements are copied. Move them now...";
const COPY_FAILED_MESSAGE: &str = "Some elements could not be copied";
const IMPORTED_MESSAGE: &str = "The element was inserted at the top left. Move it now...";
const NO_SELECTION_WARNING: &str = "Please select elements.";

/// Pick distance in screen units for edit-mode hit tests.
const EDIT_HIT_TOLERANCE: f64 = 4.0;

/// What the current gesture is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Idle,
    Drawing,
    Erasing,
    /// Moving the selection or dragging a selection band.
    Editing,
    GuideMove,
    GuideRotate,
}

/// Per-gesture state.
enum Session {
    Idle,
    Drawing {
        builder: Box<dyn ToolBuilder>,
        item: ItemId,
        tool: Tool,
    },
    Erasing {
        erase: EraseSession,
        large: bool,
    },
    Moving {
        last: Point,
        moved: bool,
    },
    RubberBand {
        start: Point,
    },
    GuideMove,
    GuideRotate,
}

/// The whiteboard canvas and its interaction state machine.
pub struct Canvas {
    scene: Scene,
    history: CommandStack,
    registry: ToolRegistry,
    guide: Guide,
    classifier: TouchClassifier,
    camera: Camera,
    bounds: CanvasBounds,
    input: InputState,
    viewport_size: Size,
    status: Status,
    pen_color: PenColor,
    pen_width: f64,
    palette: Palette,
    session: Session,
    /// Eraser shape of the running erase gesture, for rendering.
    eraser: Option<Eraser>,
    events: Vec<CanvasEvent>,
}

impl Canvas {
    /// Create a new canvas with default settings.
    pub fn new(viewport_size: Size) -> Self {
        Self {
            scene: Scene::new(),
            history: CommandStack::new(),
            registry: ToolRegistry::default(),
            guide: Guide::new(),
            classifier: TouchClassifier::default(),
            camera: Camera::new(),
            bounds: CanvasBounds::new(viewport_size.to_rect()),
            input: InputState::new(),
            viewport_size,
            status: Status::default(),
            pen_color: PenColor::Foreground,
            pen_width: BoardSettings::default().pen_width,
            palette: Palette::default(),
            session: Session::Idle,
            eraser: None,
            events: Vec::new(),
        }
    }

    /// Create a canvas seeded from persisted settings.
    pub fn from_settings(settings: &BoardSettings, viewport_size: Size) -> Result<Self, CanvasError> {
        settings.validate()?;
        let mut canvas = Self::new(viewport_size);
        canvas.pen_color = settings.pen_color;
        canvas.pen_width = settings.pen_width;
        canvas.palette = settings.palette();
        canvas.classifier = TouchClassifier::new(
            settings.calibrated_size,
            settings.big_point_factor,
            settings.very_big_point_factor,
        );
        Ok(canvas)
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &CommandStack {
        &self.history
    }

    pub fn guide(&self) -> &Guide {
        &self.guide
    }

    pub fn classifier(&self) -> &TouchClassifier {
        &self.classifier
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn bounds(&self) -> &CanvasBounds {
        &self.bounds
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn pen_color(&self) -> PenColor {
        self.pen_color
    }

    pub fn pen_width(&self) -> f64 {
        self.pen_width
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Eraser of the running erase gesture.
    pub fn eraser(&self) -> Option<&Eraser> {
        self.eraser.as_ref()
    }

    pub fn mode(&self) -> InteractionMode {
        match self.session {
            Session::Idle => InteractionMode::Idle,
            Session::Drawing { .. } => InteractionMode::Drawing,
            Session::Erasing { .. } => InteractionMode::Erasing,
            Session::Moving { .. } | Session::RubberBand { .. } => InteractionMode::Editing,
            Session::GuideMove => InteractionMode::GuideMove,
            Session::GuideRotate => InteractionMode::GuideRotate,
        }
    }

    /// Take the events emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<CanvasEvent> {
        std::mem::take(&mut self.events)
    }

    /// World rectangle currently on screen.
    pub fn view_rect(&self) -> Rect {
        self.camera.view_rect(self.viewport_size)
    }

    /// Set the viewport size.
    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport_size = size;
        let view = self.view_rect();
        self.bounds.follow_view(view);
    }

    /// Replace the tool builders.
    pub fn set_tool_registry(&mut self, registry: ToolRegistry) {
        self.registry = registry;
    }

    // --- Settings entry points ---

    /// Switch tool or top-level mode. A running gesture is committed first.
    pub fn set_status(&mut self, status: Status) {
        self.commit_session();
        if self.status == Status::Edit && status != Status::Edit {
            self.scene.clear_selection();
        }
        log::debug!("Status: {} -> {}", self.status, status);
        self.status = status;
    }

    /// Switch by status name, e.g. `"line-snapped"`.
    pub fn set_status_str(&mut self, name: &str) -> Result<(), CanvasError> {
        let status = name.parse::<Status>()?;
        self.set_status(status);
        Ok(())
    }

    pub fn set_pen_color(&mut self, color: PenColor) {
        self.pen_color = color;
    }

    pub fn set_pen_width(&mut self, width: f64) -> Result<(), CanvasError> {
        if !(width.is_finite() && width > 0.0) {
            return Err(CanvasError::InvalidSetting {
                key: "pen_width",
                reason: format!("must be a positive number, got {width}"),
            });
        }
        self.pen_width = width;
        Ok(())
    }

    /// Switch the color scheme and re-resolve foreground-linked items.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
        let changed = self.scene.apply_palette(&palette);
        log::debug!("Palette changed, {changed} items recolored");
    }

    // --- Input ---

    /// Feed one pointer event through the state machine.
    ///
    /// Fails only when the active status has no registered builder, which is
    /// a configuration bug on the caller's side.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) -> Result<(), CanvasError> {
        match event {
            PointerEvent::Down(sample) => self.pointer_down(sample),
            PointerEvent::Move(sample) => {
                self.pointer_move(sample);
                Ok(())
            }
            PointerEvent::Up(sample) => {
                self.input.handle_pointer_event(&event);
                self.pointer_released(sample.source, Some(sample.position))
            }
            PointerEvent::Cancel { source, position } => {
                self.input.handle_pointer_event(&event);
                self.pointer_released(source, position)
            }
        }
    }

    /// Two-finger pan or pinch. Any stroke in progress is dropped.
    pub fn handle_gesture(&mut self, event: GestureEvent) {
        self.cancel_session();
        match event {
            GestureEvent::Pan { delta } => {
                self.camera.pan(delta);
                let view = self.view_rect();
                self.bounds.follow_view(view);
            }
            GestureEvent::Pinch { scale, center } => self.camera.zoom_at(center, scale),
        }
    }

    fn pointer_down(&mut self, sample: PointerSample) -> Result<(), CanvasError> {
        match self.input.primary() {
            Some(primary) if primary == sample.source => {
                log::debug!("Missing end event for contact {primary}, resetting");
                self.commit_session();
                self.input.reset();
            }
            Some(_) => {
                self.input.handle_pointer_event(&PointerEvent::Down(sample));
                log::debug!("Second contact, cancelling gesture");
                self.cancel_session();
                return Ok(());
            }
            None if self.input.contact_count() > 0 => {
                log::debug!("Dropping {} stale contacts", self.input.contact_count());
                self.commit_session();
                self.input.reset();
            }
            None => {}
        }
        self.input.handle_pointer_event(&PointerEvent::Down(sample));
        let class = self.sample_contact(&sample);
        let world = self.camera.screen_to_world(sample.position);

        if let Some(handle) = self.guide.handle_at(world) {
            self.session = match handle {
                GuideHandle::Move => Session::GuideMove,
                GuideHandle::Rotate => Session::GuideRotate,
            };
            return Ok(());
        }

        if self.status.mode() == Mode::Erasing || class != ContactClass::Normal {
            let large = class == ContactClass::VeryBig;
            let eraser = self.eraser_at(world, large);
            let mut erase = EraseSession::new();
            erase.erase(&mut self.scene, &eraser);
            self.eraser = Some(eraser);
            self.session = Session::Erasing { erase, large };
            return Ok(());
        }

        match self.status.mode() {
            Mode::Editing => {
                self.start_edit(world);
                Ok(())
            }
            _ => self.start_drawing(world),
        }
    }

    fn pointer_move(&mut self, sample: PointerSample) {
        self.input.handle_pointer_event(&PointerEvent::Move(sample));
        if !self.input.is_primary(sample.source) {
            return;
        }
        if self.input.is_multi_touch() {
            self.cancel_session();
            return;
        }
        let class = self.sample_contact(&sample);
        let world = self.camera.screen_to_world(sample.position);

        match &mut self.session {
            Session::Idle => {}
            Session::Drawing { builder, item, .. } => {
                let geometry = builder.update(self.guide.snap(world)).clone();
                if let Some(item) = self.scene.get_mut(*item) {
                    item.set_path(geometry);
                }
            }
            Session::Erasing { erase, large } => {
                *large |= class == ContactClass::VeryBig;
                let eraser = if *large {
                    Eraser::large(world, self.camera.zoom)
                } else {
                    Eraser::small(world, self.pen_width, self.camera.zoom)
                };
                erase.erase(&mut self.scene, &eraser);
                self.eraser = Some(eraser);
            }
            Session::Moving { last, moved } => {
                let delta = world - *last;
                *last = world;
                if delta == Vec2::ZERO {
                    return;
                }
                let mut moves = MoveItems::new();
                for id in self.scene.selected() {
                    if let Some(item) = self.scene.get(id) {
                        moves.insert(id, item.position, item.position + delta);
                    }
                }
                if !moves.is_empty() {
                    *moved = true;
                    self.history.push(&mut self.scene, Command::MoveItems(moves));
                }
            }
            Session::RubberBand { start } => {
                self.scene.select_in_rect(Rect::from_points(*start, world));
            }
            Session::GuideMove => self.guide.move_to(world),
            Session::GuideRotate => self.guide.rotate_towards(world),
        }
    }

    fn pointer_released(&mut self, source: SourceId, position: Option<Point>) -> Result<(), CanvasError> {
        if !self.input.is_primary(source) {
            return Ok(());
        }
        let tap = position.is_some_and(|p| self.input.is_tap(p));
        let world = position.map(|p| self.camera.screen_to_world(p));
        self.input.end_gesture();

        let freehand_tap = tap && matches!(self.session, Session::Drawing { tool: Tool::Freehand, .. });
        if let (true, Some(world)) = (freehand_tap, world) {
            // Replace the zero-length stroke with a dot.
            self.session = Session::Idle;
            self.history.discard_top(&mut self.scene);
            return self.add_point(world);
        }
        self.commit_session();
        Ok(())
    }

    /// Feed the classifier and classify the contact.
    fn sample_contact(&mut self, sample: &PointerSample) -> ContactClass {
        let Some(contact) = sample.contact else {
            return ContactClass::Normal;
        };
        let size = point_size(contact);
        if let Some(mean) = self.classifier.add_sample(size) {
            self.events.push(CanvasEvent::CalibrationFinished { mean });
            self.events
                .push(CanvasEvent::status(format!("Calibrated value: {mean}"), STATUS_DURATION_MS));
        }
        self.classifier.classify(size)
    }

    fn eraser_at(&self, world: Point, large: bool) -> Eraser {
        if large {
            Eraser::large(world, self.camera.zoom)
        } else {
            Eraser::small(world, self.pen_width, self.camera.zoom)
        }
    }

    fn start_drawing(&mut self, world: Point) -> Result<(), CanvasError> {
        let tool = self
            .status
            .tool()
            .ok_or_else(|| CanvasError::UnknownStatus(self.status.to_string()))?;
        let mut builder = self.registry.create(tool, self.pen_width)?;
        builder.start(self.guide.snap(world));

        let style = self.status.style(self.pen_width, self.pen_color.resolve(&self.palette));
        let item = PathItem::new(ItemKind::Stroke, builder.geometry().clone(), style);
        let id = item.id();
        self.history.push(&mut self.scene, Command::AddItem(AddItem::new(item)));
        log::debug!("Drawing {} from {:?}", self.status, world);
        self.session = Session::Drawing { builder, item: id, tool };
        Ok(())
    }

    fn start_edit(&mut self, world: Point) {
        let tolerance = EDIT_HIT_TOLERANCE / self.camera.zoom;
        match self.scene.item_at(world, tolerance) {
            Some(id) => {
                if !self.scene.get(id).is_some_and(|item| item.selected) {
                    self.scene.select_only(id);
                }
                self.session = Session::Moving { last: world, moved: false };
            }
            None => {
                self.scene.clear_selection();
                self.session = Session::RubberBand { start: world };
            }
        }
    }

    fn add_point(&mut self, world: Point) -> Result<(), CanvasError> {
        let mut builder = self.registry.create(Tool::Point, self.pen_width)?;
        builder.start(self.guide.snap(world));
        let style = self.status.style(self.pen_width, self.pen_color.resolve(&self.palette));
        let item = PathItem::new(ItemKind::Point, builder.geometry().clone(), style);
        let id = item.id();
        self.history.push(&mut self.scene, Command::AddItem(AddItem::new(item)));
        self.grow_to_item(id);
        self.content_changed();
        Ok(())
    }

    /// Finish the running gesture as a normal end event would.
    fn commit_session(&mut self) {
        match std::mem::replace(&mut self.session, Session::Idle) {
            Session::Idle | Session::RubberBand { .. } | Session::GuideMove | Session::GuideRotate => {}
            Session::Drawing { builder, item, .. } => {
                if builder.is_degenerate() {
                    log::debug!("Dropping degenerate stroke");
                    self.history.discard_top(&mut self.scene);
                } else {
                    self.grow_to_item(item);
                    self.content_changed();
                }
            }
            Session::Erasing { erase, .. } => {
                self.eraser = None;
                if let Some(command) = erase.finish(&self.scene) {
                    self.history.push(&mut self.scene, command);
                    self.content_changed();
                }
            }
            Session::Moving { moved, .. } => {
                self.history.close_merge();
                if moved {
                    for id in self.scene.selected() {
                        self.grow_to_item(id);
                    }
                    self.content_changed();
                }
            }
        }
    }

    /// Drop a stroke in progress, commit anything else.
    fn cancel_session(&mut self) {
        if let Session::Drawing { .. } = self.session {
            self.session = Session::Idle;
            self.history.discard_top(&mut self.scene);
            log::debug!("Stroke cancelled");
        } else {
            self.commit_session();
        }
    }

    fn grow_to_item(&mut self, id: ItemId) {
        let view = self.view_rect();
        if let Some(rect) = self.scene.get(id).and_then(PathItem::bounds) {
            self.bounds.include(rect, view);
        }
    }

    fn content_changed(&mut self) {
        self.events.push(CanvasEvent::ContentChanged {
            item_count: self.scene.len(),
        });
    }

    fn warn_no_selection(&mut self) {
        log::warn!("{NO_SELECTION_WARNING}");
        self.events.push(CanvasEvent::Warning(NO_SELECTION_WARNING.to_string()));
    }

    // --- Actions ---

    /// Remove the selected items as one undo step.
    pub fn delete_selected(&mut self) {
        let selected = self.scene.selected();
        if selected.is_empty() {
            self.warn_no_selection();
            return;
        }
        self.history.begin_macro("Delete");
        for id in selected {
            self.history.push(&mut self.scene, Command::RemoveItem(RemoveItem::new(id)));
        }
        self.history.end_macro();
        self.content_changed();
    }

    /// Duplicate the selected items, each copy stacked right below its original.
    ///
    /// Items that cannot be cloned are skipped and reported once.
    pub fn copy_selected(&mut self) {
        let selected = self.scene.selected();
        if selected.is_empty() {
            self.warn_no_selection();
            return;
        }
        let mut failed = false;
        self.history.begin_macro("Copy");
        for id in selected {
            let Some(item) = self.scene.get(id) else { continue };
            match item.duplicate() {
                Ok(copy) => {
                    let index = self.scene.index_of(id).unwrap_or_default();
                    self.history.push(&mut self.scene, Command::AddItem(AddItem::at(index, copy)));
                }
                Err(e) => {
                    log::warn!("Copy skipped: {e}");
                    failed = true;
                }
            }
        }
        self.history.end_macro();
        let message = if failed {
            CanvasEvent::status(COPY_FAILED_MESSAGE, SHORT_STATUS_DURATION_MS)
        } else {
            CanvasEvent::status(COPIED_MESSAGE, STATUS_DURATION_MS)
        };
        self.events.push(message);
        self.content_changed();
    }

    /// Remove everything as one undo step. The guide stays.
    pub fn clear_all(&mut self) {
        self.commit_session();
        self.history.begin_macro("Clear");
        for id in self.scene.ids() {
            self.history.push(&mut self.scene, Command::RemoveItem(RemoveItem::new(id)));
        }
        self.history.end_macro();
        self.content_changed();
    }

    /// Zoom the view in, or grow the selection in edit mode.
    pub fn zoom_in(&mut self) {
        self.zoom_by(ZOOM_STEP);
    }

    /// Zoom the view out, or shrink the selection in edit mode.
    pub fn zoom_out(&mut self) {
        self.zoom_by(1.0 / ZOOM_STEP);
    }

    /// Reset the view to its initial pan and zoom, or the selection's scale in edit mode.
    pub fn zoom_reset(&mut self) {
        if self.status == Status::Edit {
            self.scale_selection(|_| 1.0);
        } else {
            self.camera.reset();
            let view = self.view_rect();
            self.bounds.follow_view(view);
        }
    }

    fn zoom_by(&mut self, factor: f64) {
        if self.status == Status::Edit {
            self.scale_selection(|scale| scale * factor);
        } else {
            let center = self.viewport_size.to_rect().center();
            self.camera.zoom_at(center, factor);
        }
    }

    fn scale_selection(&mut self, scale: impl Fn(f64) -> f64) {
        let selected = self.scene.selected();
        if selected.is_empty() {
            self.warn_no_selection();
            return;
        }
        let changes = selected
            .iter()
            .filter_map(|&id| self.scene.get(id).map(|item| (id, item.scale, scale(item.scale))))
            .collect();
        self.history.push(&mut self.scene, Command::ScaleItems(ScaleItems::new(changes)));
        for id in selected {
            self.grow_to_item(id);
        }
        self.content_changed();
    }

    pub fn undo(&mut self) {
        self.commit_session();
        if self.history.undo(&mut self.scene) {
            self.content_changed();
        }
    }

    pub fn redo(&mut self) {
        self.commit_session();
        if self.history.redo(&mut self.scene) {
            self.content_changed();
        }
    }

    /// End the current drag so the next move starts a new undo step.
    pub fn end_drag(&mut self) {
        self.history.close_merge();
    }

    /// Show the guide in the middle of the view, or hide it.
    pub fn enable_guide(&mut self, enable: bool) {
        if enable {
            let center = self.view_rect().center();
            self.guide.enable_at(center);
        } else {
            self.guide.disable();
        }
    }

    pub fn start_calibration(&mut self) {
        self.classifier.start_calibration();
    }

    /// Add an externally built item with its top-left corner at the top-left of the view.
    pub fn import_item(&mut self, mut item: PathItem) -> ItemId {
        self.commit_session();
        let view = self.view_rect();
        if let Some(rect) = item.bounds() {
            item.position += view.origin() - rect.origin();
        }
        item.selected = false;
        let id = item.id();
        self.history.push(&mut self.scene, Command::AddItem(AddItem::new(item)));
        self.grow_to_item(id);
        self.events.push(CanvasEvent::status(IMPORTED_MESSAGE, STATUS_DURATION_MS));
        self.content_changed();
        id
    }

    /// Insert a background paper.
    pub fn insert_paper(&mut self, kind: PaperKind) -> ItemId {
        let paper = match kind {
            PaperKind::Graph => graph_paper(),
            PaperKind::Lined => lined_paper(),
        };
        self.import_item(paper)
    }

    /// Move the view half a screen towards a side, growing the board as needed.
    pub fn extend(&mut self, side: Side) {
        let view = self.view_rect();
        let center = self.bounds.extend(side, view);
        self.camera.center_on(center, self.viewport_size);
    }
}
