use std::collections::{HashMap, HashSet};

use glam::Vec2;

use crate::coords::SurfaceSize;
use crate::input::PointerEvent;
use crate::raycast::Raycaster;
use crate::scene::{ObjectHandle, Scene};

/// Callback slot receiving the raw pointer event.
pub type PointerCallback = Box<dyn FnMut(&PointerEvent)>;

/// Pointer hit-test dispatcher.
///
/// Every pointer move casts a ray through the scene and drives a two-state
/// machine (not hovered / hovered) per object:
/// - first move that hits the object: `enter`, then `hover`
/// - every later move that still hits it: `hover`
/// - first move that misses it: `leave`
///
/// Callbacks are keyed by handle; registering again for the same handle
/// replaces the previous callback. Handles without a callback are skipped.
///
/// Removing an object from the scene does not fire `leave` by itself; the
/// handle stays hovered until the next move event misses it.
#[derive(Default)]
pub struct PointerDispatcher {
    latest: Option<PointerEvent>,
    latest_ndc: Option<Vec2>,
    hovered: HashSet<ObjectHandle>,

    enter_fns: HashMap<ObjectHandle, PointerCallback>,
    hover_fns: HashMap<ObjectHandle, PointerCallback>,
    leave_fns: HashMap<ObjectHandle, PointerCallback>,

    skip_hidden: bool,
}

impl PointerDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Excludes invisible objects from hit-testing. Off by default.
    pub fn set_skip_hidden(&mut self, skip: bool) {
        self.skip_hidden = skip;
    }

    pub fn add_hover_function(&mut self, handle: ObjectHandle, f: impl FnMut(&PointerEvent) + 'static) {
        self.hover_fns.insert(handle, Box::new(f));
    }

    pub fn add_enter_function(&mut self, handle: ObjectHandle, f: impl FnMut(&PointerEvent) + 'static) {
        self.enter_fns.insert(handle, Box::new(f));
    }

    pub fn add_leave_function(&mut self, handle: ObjectHandle, f: impl FnMut(&PointerEvent) + 'static) {
        self.leave_fns.insert(handle, Box::new(f));
    }

    /// Drops every callback registered for `handle`. Hover state is untouched.
    pub fn remove_callbacks(&mut self, handle: ObjectHandle) {
        self.enter_fns.remove(&handle);
        self.hover_fns.remove(&handle);
        self.leave_fns.remove(&handle);
    }

    /// Most recent pointer move, if any.
    #[inline]
    pub fn latest_pointer_event(&self) -> Option<&PointerEvent> {
        self.latest.as_ref()
    }

    /// Most recent pointer position in normalized device coordinates.
    #[inline]
    pub fn pointer_ndc(&self) -> Option<Vec2> {
        self.latest_ndc
    }

    #[inline]
    pub fn is_hovered(&self, handle: ObjectHandle) -> bool {
        self.hovered.contains(&handle)
    }

    /// Currently hovered handles in ascending order.
    pub fn hovered(&self) -> Vec<ObjectHandle> {
        let mut v: Vec<_> = self.hovered.iter().copied().collect();
        v.sort_unstable();
        v
    }

    /// Hit-tests `event` against `scene` and fires callbacks.
    ///
    /// Completes synchronously: state is updated and every callback has run
    /// when this returns.
    pub fn handle_pointer_move(&mut self, event: PointerEvent, scene: &Scene, size: SurfaceSize) {
        let ndc = size.to_ndc(event.x, event.y);
        let hits: Vec<ObjectHandle> = Raycaster::from_camera(&scene.camera, ndc)
            .skip_hidden(self.skip_hidden)
            .intersect_objects(scene)
            .into_iter()
            .map(|hit| hit.handle)
            .collect();

        log::trace!("pointer: ({:.1}, {:.1}) hits {:?}", event.x, event.y, hits);

        self.dispatch(&event, &hits);
        self.latest_ndc = Some(ndc);
    }

    /// State-machine step for one move event given the objects under the ray.
    ///
    /// `hits` may contain duplicates; each handle is processed once, in first
    /// occurrence order. Leaves fire after all enters/hovers, in ascending
    /// handle order.
    pub fn dispatch(&mut self, event: &PointerEvent, hits: &[ObjectHandle]) {
        let mut seen: HashSet<ObjectHandle> = HashSet::with_capacity(hits.len());

        for &handle in hits {
            if !seen.insert(handle) {
                continue;
            }

            if self.hovered.insert(handle) {
                log::debug!("pointer: enter {handle}");
                if let Some(f) = self.enter_fns.get_mut(&handle) {
                    f(event);
                }
            }

            if let Some(f) = self.hover_fns.get_mut(&handle) {
                f(event);
            }
        }

        let mut left: Vec<ObjectHandle> = self
            .hovered
            .iter()
            .filter(|h| !seen.contains(h))
            .copied()
            .collect();
        left.sort_unstable();

        for handle in left {
            self.hovered.remove(&handle);
            log::debug!("pointer: leave {handle}");
            if let Some(f) = self.leave_fns.get_mut(&handle) {
                f(event);
            }
        }

        self.latest = Some(*event);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec3;

    use super::*;
    use crate::coords::ColorRgba;
    use crate::scene::{Geometry, Material, RenderableObject};

    type Trace = Rc<RefCell<Vec<String>>>;

    fn record(trace: &Trace, what: &'static str, name: &'static str) -> impl FnMut(&PointerEvent) + 'static {
        let trace = Rc::clone(trace);
        move |_| trace.borrow_mut().push(format!("{what}({name})"))
    }

    fn wire(d: &mut PointerDispatcher, trace: &Trace, h: ObjectHandle, name: &'static str) {
        d.add_enter_function(h, record(trace, "enter", name));
        d.add_hover_function(h, record(trace, "hover", name));
        d.add_leave_function(h, record(trace, "leave", name));
    }

    fn handles(scene: &mut Scene, n: usize) -> Vec<ObjectHandle> {
        (0..n)
            .map(|_| {
                scene.add(RenderableObject::new(
                    "o",
                    Geometry::plane(1.0, 1.0, 1, 1),
                    Material::basic(ColorRgba::white()),
                ))
            })
            .collect()
    }

    fn ev() -> PointerEvent {
        PointerEvent::at(0.0, 0.0)
    }

    // ── state machine ─────────────────────────────────────────────────────

    #[test]
    fn enter_hover_hover_hover_leave() {
        let mut scene = Scene::default();
        let a = handles(&mut scene, 1)[0];
        let trace: Trace = Rc::default();
        let mut d = PointerDispatcher::new();
        wire(&mut d, &trace, a, "A");

        d.dispatch(&ev(), &[a]);
        d.dispatch(&ev(), &[a]);
        d.dispatch(&ev(), &[a]);
        d.dispatch(&ev(), &[]);

        assert_eq!(
            *trace.borrow(),
            ["enter(A)", "hover(A)", "hover(A)", "hover(A)", "leave(A)"]
        );
        assert!(!d.is_hovered(a));
    }

    #[test]
    fn one_enter_and_leave_per_interval() {
        let mut scene = Scene::default();
        let a = handles(&mut scene, 1)[0];
        let trace: Trace = Rc::default();
        let mut d = PointerDispatcher::new();
        wire(&mut d, &trace, a, "A");

        // hit pattern: 1 1 0 0 1 0 1 1 1 0
        let pattern = [true, true, false, false, true, false, true, true, true, false];
        for hit in pattern {
            let hits: &[ObjectHandle] = if hit { &[a] } else { &[] };
            d.dispatch(&ev(), hits);
        }

        let t = trace.borrow();
        let count = |s: &str| t.iter().filter(|e| e.as_str() == s).count();
        assert_eq!(count("enter(A)"), 3);
        assert_eq!(count("leave(A)"), 3);
        assert_eq!(count("hover(A)"), 6);

        // Every enter is directly followed by a hover; leaves alternate with enters.
        let transitions: Vec<&str> = t
            .iter()
            .filter(|e| !e.starts_with("hover"))
            .map(|e| e.as_str())
            .collect();
        assert_eq!(
            transitions,
            ["enter(A)", "leave(A)", "enter(A)", "leave(A)", "enter(A)", "leave(A)"]
        );
    }

    #[test]
    fn duplicate_hits_count_once() {
        let mut scene = Scene::default();
        let a = handles(&mut scene, 1)[0];
        let trace: Trace = Rc::default();
        let mut d = PointerDispatcher::new();
        wire(&mut d, &trace, a, "A");

        d.dispatch(&ev(), &[a, a]);
        assert_eq!(*trace.borrow(), ["enter(A)", "hover(A)"]);
    }

    #[test]
    fn independent_objects_interleave() {
        let mut scene = Scene::default();
        let hs = handles(&mut scene, 2);
        let (a, b) = (hs[0], hs[1]);
        let trace: Trace = Rc::default();
        let mut d = PointerDispatcher::new();
        wire(&mut d, &trace, a, "A");
        wire(&mut d, &trace, b, "B");

        d.dispatch(&ev(), &[a]);
        d.dispatch(&ev(), &[b, a]);
        d.dispatch(&ev(), &[b]);

        assert_eq!(
            *trace.borrow(),
            [
                "enter(A)", "hover(A)",
                "enter(B)", "hover(B)", "hover(A)",
                "hover(B)", "leave(A)",
            ]
        );
    }

    // ── registration ──────────────────────────────────────────────────────

    #[test]
    fn re_registering_enter_replaces_previous() {
        let mut scene = Scene::default();
        let a = handles(&mut scene, 1)[0];
        let trace: Trace = Rc::default();
        let mut d = PointerDispatcher::new();

        d.add_enter_function(a, record(&trace, "old", "A"));
        d.add_enter_function(a, record(&trace, "new", "A"));
        d.dispatch(&ev(), &[a]);

        assert_eq!(*trace.borrow(), ["new(A)"]);
    }

    #[test]
    fn unregistered_handles_are_tracked_silently() {
        let mut scene = Scene::default();
        let a = handles(&mut scene, 1)[0];
        let mut d = PointerDispatcher::new();
        d.dispatch(&ev(), &[a]);
        assert!(d.is_hovered(a));
        d.dispatch(&ev(), &[]);
        assert!(!d.is_hovered(a));
    }

    #[test]
    fn remove_callbacks_silences_handle() {
        let mut scene = Scene::default();
        let a = handles(&mut scene, 1)[0];
        let trace: Trace = Rc::default();
        let mut d = PointerDispatcher::new();
        wire(&mut d, &trace, a, "A");
        d.remove_callbacks(a);
        d.dispatch(&ev(), &[a]);
        assert!(trace.borrow().is_empty());
    }

    #[test]
    fn callbacks_receive_the_raw_event() {
        let mut scene = Scene::default();
        let a = handles(&mut scene, 1)[0];
        let seen = Rc::new(RefCell::new(None));
        let mut d = PointerDispatcher::new();
        let sink = Rc::clone(&seen);
        d.add_hover_function(a, move |e| *sink.borrow_mut() = Some(*e));

        let e = PointerEvent { x: 3.0, y: 4.0, movement_x: 1.5, movement_y: -2.0 };
        d.dispatch(&e, &[a]);
        assert_eq!(*seen.borrow(), Some(e));
        assert_eq!(d.latest_pointer_event(), Some(&e));
    }

    // ── scene integration ─────────────────────────────────────────────────

    fn donut_scene() -> (Scene, ObjectHandle) {
        let mut scene = Scene::default();
        scene.camera.position = Vec3::new(0.0, 0.0, 1.5);
        let h = scene.add(RenderableObject::new(
            "donut",
            Geometry::torus(0.3, 0.1, 16, 100),
            Material::basic(ColorRgba::white()),
        ));
        (scene, h)
    }

    fn screen_pos_of(scene: &Scene, size: SurfaceSize, world: Vec3) -> (f32, f32) {
        let ndc = scene.camera.view_projection().project_point3(world);
        ((ndc.x + 1.0) * 0.5 * size.width, (1.0 - ndc.y) * 0.5 * size.height)
    }

    #[test]
    fn pointer_moves_over_real_geometry() {
        let (scene, donut) = donut_scene();
        let size = SurfaceSize::new(800.0, 800.0, 1.0);
        let trace: Trace = Rc::default();
        let mut d = PointerDispatcher::new();
        wire(&mut d, &trace, donut, "donut");

        let (tx, ty) = screen_pos_of(&scene, size, Vec3::new(0.3, 0.0, 0.0));
        d.handle_pointer_move(PointerEvent::at(tx, ty), &scene, size);
        d.handle_pointer_move(PointerEvent::at(tx, ty + 1.0), &scene, size);
        // Center of the hole.
        d.handle_pointer_move(PointerEvent::at(400.0, 400.0), &scene, size);

        assert_eq!(*trace.borrow(), ["enter(donut)", "hover(donut)", "hover(donut)", "leave(donut)"]);
        assert_eq!(d.pointer_ndc(), Some(Vec2::ZERO));
    }

    #[test]
    fn removed_object_leaves_on_next_move_only() {
        let (mut scene, donut) = donut_scene();
        let size = SurfaceSize::new(800.0, 800.0, 1.0);
        let trace: Trace = Rc::default();
        let mut d = PointerDispatcher::new();
        wire(&mut d, &trace, donut, "donut");

        let (tx, ty) = screen_pos_of(&scene, size, Vec3::new(0.3, 0.0, 0.0));
        d.handle_pointer_move(PointerEvent::at(tx, ty), &scene, size);
        scene.remove(donut);

        assert!(d.is_hovered(donut));
        assert_eq!(trace.borrow().len(), 2);

        d.handle_pointer_move(PointerEvent::at(tx, ty), &scene, size);
        assert_eq!(trace.borrow().last().map(String::as_str), Some("leave(donut)"));
    }
}
