//! Collider Proxies
//!
//! One invisible box per placed block, used only for snapping raycasts.
//! A proxy follows its owner's position and rotation but is always sized
//! from the owner kind's half extent, so an edited multi-face block is
//! raycast as the box it started as. Proxies refer to their owner by id.

use glam::{Mat4, Vec3};

use crate::game::block_editor::block::{Block, BlockId};
use crate::game::block_editor::library::KindRegistry;
use crate::geometry::Transform;
use crate::physics::collision::Ray;

/// Half size of the unit box every proxy scales.
const PROXY_HALF: f32 = 0.5;

/// Local direction components below this are treated as parallel to a side.
const PARALLEL_EPS: f32 = 1e-10;

/// Invisible stand-in for one block.
#[derive(Debug, Clone, PartialEq)]
pub struct Proxy {
    pub owner: BlockId,
    pub transform: Transform,
}

/// Closest proxy struck by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProxyHit {
    pub owner: BlockId,
    pub distance: f32,
    pub point: Vec3,
    /// World-space outward normal of the struck side
    pub normal: Vec3,
}

/// Keeps exactly one proxy per live block.
#[derive(Debug, Clone)]
pub struct ProxyManager {
    proxies: Vec<Proxy>,
    padding: f32,
}

impl ProxyManager {
    pub fn new(padding: f32) -> Self {
        Self {
            proxies: Vec::new(),
            padding,
        }
    }

    fn scale_for(&self, half: Vec3) -> Vec3 {
        half * 2.0 + Vec3::splat(self.padding)
    }

    /// Create (or replace) the proxy for `owner`.
    pub fn attach(&mut self, owner: BlockId, block_transform: &Transform, half: Vec3) {
        let transform = Transform {
            position: block_transform.position,
            rotation: block_transform.rotation,
            scale: self.scale_for(half),
        };
        match self.proxies.iter_mut().find(|p| p.owner == owner) {
            Some(existing) => existing.transform = transform,
            None => self.proxies.push(Proxy { owner, transform }),
        }
    }

    /// Remove the proxy for `owner`. Returns false if it had none.
    pub fn detach(&mut self, owner: BlockId) -> bool {
        let before = self.proxies.len();
        self.proxies.retain(|p| p.owner != owner);
        self.proxies.len() != before
    }

    pub fn clear(&mut self) {
        self.proxies.clear();
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    pub fn get(&self, owner: BlockId) -> Option<&Proxy> {
        self.proxies.iter().find(|p| p.owner == owner)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Proxy> {
        self.proxies.iter()
    }

    /// Per-frame update: mirror each owner's pose and resize from its kind.
    pub fn sync(&mut self, blocks: &[Block], registry: &KindRegistry) {
        let padding = self.padding;
        for proxy in &mut self.proxies {
            let Some(owner) = blocks.iter().find(|b| b.id == proxy.owner) else {
                continue;
            };
            proxy.transform.position = owner.transform.position;
            proxy.transform.rotation = owner.transform.rotation;
            proxy.transform.scale =
                registry.half_extent(&owner.kind) * 2.0 + Vec3::splat(padding);
        }
    }

    /// Nearest proxy hit along `ray`.
    pub fn raycast(&self, ray: &Ray) -> Option<ProxyHit> {
        self.proxies
            .iter()
            .filter_map(|p| Self::raycast_one(p, ray))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn raycast_one(proxy: &Proxy, ray: &Ray) -> Option<ProxyHit> {
        let matrix: Mat4 = proxy.transform.matrix();
        let inverse = matrix.inverse();
        if !inverse.is_finite() {
            return None;
        }
        // Affine map keeps the ray parameter, so `t` is a world distance.
        let local_origin = inverse.transform_point3(ray.origin);
        let local_dir = inverse.transform_vector3(ray.direction);
        let (t, local_normal) = hit_unit_box(local_origin, local_dir)?;
        let normal = (proxy.transform.quat() * local_normal).normalize_or_zero();

        Some(ProxyHit {
            owner: proxy.owner,
            distance: t,
            point: ray.at(t),
            normal,
        })
    }
}

/// Where a local-space ray meets the proxy box: distance along the ray and
/// the outward normal of the side crossed. A ray starting inside the box
/// reports the side it leaves through.
fn hit_unit_box(origin: Vec3, dir: Vec3) -> Option<(f32, Vec3)> {
    let mut enter = (f32::NEG_INFINITY, Vec3::ZERO);
    let mut leave = (f32::INFINITY, Vec3::ZERO);

    for (axis, unit) in Vec3::AXES.into_iter().enumerate() {
        let (o, d) = (origin[axis], dir[axis]);
        if d.abs() < PARALLEL_EPS {
            if o.abs() > PROXY_HALF {
                return None;
            }
            continue;
        }
        // -1 when the ray travels toward +axis, so it crosses the min side first
        let first = -d.signum();
        let t_first = (first * PROXY_HALF - o) / d;
        let t_second = (-first * PROXY_HALF - o) / d;
        if t_first > enter.0 {
            enter = (t_first, unit * first);
        }
        if t_second < leave.0 {
            leave = (t_second, unit * -first);
        }
    }

    if !leave.0.is_finite() || leave.0 < enter.0.max(0.0) {
        return None;
    }
    Some(if enter.0 >= 0.0 { enter } else { leave })
}
