use std::time::{Duration, Instant};

use canvas_bridge::prelude::*;
use rayon::prelude::*;

/// How long the demo pretends its scripts take to load.
const LOAD_DELAY: Duration = Duration::from_millis(250);

const ORBIT_SPEED: f64 = 0.01;
const ZOOM_SPEED: f64 = 0.002;
const MIN_DISTANCE: f64 = 1.6;
const MAX_DISTANCE: f64 = 12.0;
const MAX_PITCH: f64 = 1.45;

const PALETTE: [[f64; 3]; 4] = [
    [0.93, 0.36, 0.24],
    [0.25, 0.62, 0.93],
    [0.42, 0.85, 0.38],
    [0.95, 0.82, 0.30],
];

/// A CPU-rendered sphere over a ground plane.
///
/// Left-drag orbits the camera, the wheel zooms and Space cycles the sphere
/// color. Only the pointer family is handled; the mouse family duplicates
/// would otherwise apply every gesture twice.
pub struct OrbitEngine {
    surface: Option<SurfaceSize>,
    notifier: Option<ReadyNotifier>,
    started: Instant,
    loaded: bool,
    yaw: f64,
    pitch: f64,
    distance: f64,
    color: usize,
    dragging: bool,
}

impl OrbitEngine {
    pub fn launch() -> (Self, ReadyListener) {
        let (notifier, listener) = ready_channel();

        let engine = Self {
            surface: None,
            notifier: Some(notifier),
            started: Instant::now(),
            loaded: false,
            yaw: 0.6,
            pitch: 0.35,
            distance: 4.0,
            color: 0,
            dragging: false,
        };

        (engine, listener)
    }

    fn camera(&self) -> Camera {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        let eye = [
            self.distance * cp * sy,
            self.distance * sp,
            self.distance * cp * cy,
        ];

        let forward = normalize(scale(eye, -1.0));
        let right = normalize(cross(forward, [0.0, 1.0, 0.0]));
        let up = cross(right, forward);

        Camera {
            eye,
            forward,
            right,
            up,
        }
    }
}

impl VirtualInput for OrbitEngine {
    fn is_input_ready(&self) -> bool {
        self.loaded && self.surface.is_some()
    }

    fn deliver(&mut self, event: &EngineEvent) -> Result<(), EngineError> {
        if !self.is_input_ready() {
            return Err(EngineError::NotReady);
        }

        match event.kind {
            EventKind::PointerDown if event.button == 0 => self.dragging = true,
            EventKind::PointerUp if event.button == 0 => self.dragging = false,
            EventKind::PointerOut => self.dragging = false,
            EventKind::PointerMove if self.dragging => {
                self.yaw -= event.movement_x * ORBIT_SPEED;
                self.pitch = (self.pitch + event.movement_y * ORBIT_SPEED)
                    .clamp(-MAX_PITCH, MAX_PITCH);
            }
            EventKind::Wheel => {
                self.distance = (self.distance
                    * (event.delta_y * ZOOM_SPEED).exp())
                .clamp(MIN_DISTANCE, MAX_DISTANCE);
            }
            EventKind::KeyDown if event.code == "Space" => {
                self.color = (self.color + 1) % PALETTE.len();
            }
            _ => {}
        }

        Ok(())
    }
}

impl OffscreenSurface for OrbitEngine {
    fn create_surface(&mut self, size: SurfaceSize) -> Result<(), EngineError> {
        self.surface = Some(size);
        Ok(())
    }

    fn destroy_surface(&mut self) {
        self.surface = None;
        self.dragging = false;
    }

    fn read_pixels(
        &mut self,
        size: SurfaceSize,
        out: &mut [u8],
    ) -> Result<(), EngineError> {
        if self.surface != Some(size) {
            return Err(EngineError::NoSurface);
        }

        let camera = self.camera();
        let base = PALETTE[self.color];
        let width = size.width as usize;
        let aspect = f64::from(size.width) / f64::from(size.height);

        out.par_chunks_mut(width * 4)
            .enumerate()
            .for_each(|(y, row)| {
                let v = 1.0 - 2.0 * (y as f64 + 0.5) / f64::from(size.height);
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    let u = (2.0 * (x as f64 + 0.5) / width as f64 - 1.0)
                        * aspect;
                    let color = shade(&camera, base, u, v);
                    px.copy_from_slice(&to_rgba(color));
                }
            });

        Ok(())
    }
}

impl Engine for OrbitEngine {
    fn pump(&mut self) -> Result<(), EngineError> {
        if self.loaded || self.started.elapsed() < LOAD_DELAY {
            return Ok(());
        }

        self.loaded = true;
        if let Some(notifier) = self.notifier.take() {
            log::info!("orbit demo loaded");
            notifier.notify();
        }

        Ok(())
    }
}

struct Camera {
    eye: [f64; 3],
    forward: [f64; 3],
    right: [f64; 3],
    up: [f64; 3],
}

const LIGHT: [f64; 3] = [0.48, 0.8, 0.36];
const GROUND_Y: f64 = -1.0;

fn shade(camera: &Camera, base: [f64; 3], u: f64, v: f64) -> [f64; 3] {
    let dir = normalize(add(
        camera.forward,
        add(scale(camera.right, u * 0.6), scale(camera.up, v * 0.6)),
    ));

    if let Some(t) = hit_sphere(camera.eye, dir) {
        let normal = normalize(add(camera.eye, scale(dir, t)));
        let diffuse = dot(normal, LIGHT).max(0.0);
        let rim = (1.0 - dot(normal, scale(dir, -1.0)).max(0.0)).powi(3);
        return [0, 1, 2].map(|i| base[i] * (0.15 + 0.85 * diffuse) + rim * 0.25);
    }

    if dir[1] < 0.0 {
        let t = (GROUND_Y - camera.eye[1]) / dir[1];
        let point = add(camera.eye, scale(dir, t));
        let checker = ((point[0].floor() + point[2].floor()) as i64).rem_euclid(2);
        let tone = if checker == 0 { 0.32 } else { 0.22 };
        let shadow = if hit_sphere(point, LIGHT).is_some() { 0.45 } else { 1.0 };
        let fade = (-t * 0.08).exp();
        return [tone * shadow * fade + 0.05 * (1.0 - fade); 3];
    }

    let sky = dir[1].clamp(0.0, 1.0);
    [0.55 - 0.35 * sky, 0.65 - 0.3 * sky, 0.8 - 0.15 * sky]
}

/// Nearest positive hit against the unit sphere at the origin.
fn hit_sphere(origin: [f64; 3], dir: [f64; 3]) -> Option<f64> {
    let b = dot(origin, dir);
    let c = dot(origin, origin) - 1.0;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }

    let t = -b - disc.sqrt();
    (t > 1e-4).then_some(t)
}

fn to_rgba(color: [f64; 3]) -> [u8; 4] {
    let [r, g, b] = color.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    [r, g, b, 255]
}

fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(a: [f64; 3]) -> [f64; 3] {
    let len = dot(a, a).sqrt();
    if len == 0.0 { a } else { scale(a, 1.0 / len) }
}
