//! Icon anchors and overlap relaxation

use lumaplan_core::{
    ClusterMode, Entity, EntityCatalog, House, LumaplanError, Point2, Result, WorldPoint,
};
use lumaplan_projection::ProjectionContext;

/// Icon radius including margin, in render pixels
pub const ICON_RADIUS_PX: f64 = 25.0;

pub const MAX_RELAX_ITERATIONS: usize = 100;

/// Distance an icon moves per iteration, in render pixels
const STEP_PX: f64 = 2.0;

const FALLBACK_ANCHOR: Point2 = Point2::new(50.0, 50.0);

/// Average projected top surface of the entity's pieces, in viewport percent.
///
/// Fails when a piece or its level cannot be found. A piece in the camera
/// plane contributes the viewport center.
pub fn compute_anchor(entity: &Entity, house: &House, ctx: &ProjectionContext) -> Result<Point2> {
    if entity.piece_ids.is_empty() {
        return Err(LumaplanError::GeometryError(format!(
            "entity {} has no furniture pieces",
            entity.name
        )));
    }

    let mut sum = Point2::ZERO;
    for id in &entity.piece_ids {
        let piece = house
            .piece(id)
            .ok_or_else(|| LumaplanError::EntityNotFound(format!("{} (piece {})", entity.name, id)))?;
        let level_offset = match piece.level.as_deref() {
            Some(level_id) => {
                house
                    .level(level_id)
                    .ok_or_else(|| LumaplanError::LevelNotFound(level_id.to_string()))?
                    .elevation
            }
            None => 0.0,
        };
        let top = WorldPoint::new(piece.x, piece.y, piece.elevation + piece.height + level_offset);
        let point = ctx.project_to_viewport_percent(top).unwrap_or_else(|| {
            log::warn!(
                "Piece {} of {} is in the camera plane, defaulting to screen center",
                piece.id,
                entity.name
            );
            FALLBACK_ANCHOR
        });
        sum = sum + point;
    }
    Ok(sum / entity.piece_ids.len() as f64)
}

/// `String.hashCode` over UTF-16 code units.
///
/// Seeds the tie-break direction of coincident icons so layouts repeat
/// across runs.
pub fn java_string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaxOutcome {
    pub iterations: usize,
    /// False when icons still intersect after the iteration cap
    pub converged: bool,
}

fn to_pixels(p: Point2, width: f64, height: f64) -> Point2 {
    Point2::new(p.x / 100.0 * width, p.y / 100.0 * height)
}

fn intersects(a: Point2, b: Point2) -> bool {
    a.distance_squared(&b) <= (ICON_RADIUS_PX * 2.0).powi(2)
}

/// Greedy clustering: an icon joins the first cluster it touches, otherwise
/// pairs with the first icon it touches.
/// Clusters are never merged with each other.
fn single_linkage_clusters(pixels: &[Point2]) -> Vec<Vec<usize>> {
    let mut clusters: Vec<Vec<usize>> = Vec::new();
    for i in 0..pixels.len() {
        if let Some(cluster) = clusters
            .iter_mut()
            .find(|c| c.iter().any(|&j| intersects(pixels[i], pixels[j])))
        {
            if !cluster.contains(&i) {
                cluster.push(i);
            }
            continue;
        }
        if let Some(j) = (0..pixels.len()).find(|&j| j != i && intersects(pixels[i], pixels[j])) {
            clusters.push(vec![i, j]);
        }
    }
    clusters
}

/// Connected components of the intersection graph with two or more icons.
fn union_find_clusters(pixels: &[Point2]) -> Vec<Vec<usize>> {
    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    let mut parent: Vec<usize> = (0..pixels.len()).collect();
    for i in 0..pixels.len() {
        for j in (i + 1)..pixels.len() {
            if intersects(pixels[i], pixels[j]) {
                let (a, b) = (find(&mut parent, i), find(&mut parent, j));
                if a != b {
                    parent[b] = a;
                }
            }
        }
    }

    let mut clusters: Vec<Vec<usize>> = Vec::new();
    let mut roots: Vec<usize> = Vec::new();
    for i in 0..pixels.len() {
        let root = find(&mut parent, i);
        match roots.iter().position(|&r| r == root) {
            Some(k) => clusters[k].push(i),
            None => {
                roots.push(root);
                clusters.push(vec![i]);
            }
        }
    }
    clusters.retain(|c| c.len() > 1);
    clusters
}

/// Push intersecting icons apart.
///
/// Each iteration clusters intersecting icons and moves every member one
/// step away from its cluster's centroid. Pinned entities stay put. Stops
/// when nothing intersects or after `MAX_RELAX_ITERATIONS`.
pub fn relax_overlaps(
    entities: &mut [&mut Entity],
    width: u32,
    height: u32,
    mode: ClusterMode,
) -> RelaxOutcome {
    let (w, h) = (width as f64, height as f64);
    let step = Point2::new(100.0 * STEP_PX / w, 100.0 * STEP_PX / h);

    for iteration in 0..MAX_RELAX_ITERATIONS {
        let pixels: Vec<Point2> = entities
            .iter()
            .map(|e| to_pixels(e.position(), w, h))
            .collect();
        let clusters = match mode {
            ClusterMode::SingleLinkage => single_linkage_clusters(&pixels),
            ClusterMode::UnionFind => union_find_clusters(&pixels),
        };
        if clusters.is_empty() {
            return RelaxOutcome {
                iterations: iteration,
                converged: true,
            };
        }

        for cluster in clusters {
            let centroid = cluster
                .iter()
                .fold(Point2::ZERO, |acc, &i| acc + entities[i].position())
                / cluster.len() as f64;
            for &i in &cluster {
                let entity = &mut entities[i];
                let mut direction = entity.position() - centroid;
                if direction.length() == 0.0 {
                    direction = Point2::new(
                        java_string_hash(&entity.id) as f64,
                        java_string_hash(&entity.name) as f64,
                    );
                    if direction.length() == 0.0 {
                        direction = Point2::new(1.0, 0.0);
                    }
                }
                let unit = direction.normalized();
                entity.move_by(Point2::new(unit.x * step.x, unit.y * step.y));
            }
        }
    }

    let pixels: Vec<Point2> = entities
        .iter()
        .map(|e| to_pixels(e.position(), w, h))
        .collect();
    let converged = union_find_clusters(&pixels).is_empty();
    if !converged {
        log::warn!(
            "State icons still overlap after {} iterations",
            MAX_RELAX_ITERATIONS
        );
    }
    RelaxOutcome {
        iterations: MAX_RELAX_ITERATIONS,
        converged,
    }
}

/// Anchor every visible entity and optionally relax overlapping icons.
///
/// Always-on entities get an anchor but take no part in relaxation since
/// they have no state icon.
pub fn position_entities(
    catalog: &mut EntityCatalog,
    house: &House,
    ctx: &ProjectionContext,
    relax: Option<ClusterMode>,
) -> Result<Option<RelaxOutcome>> {
    for entity in catalog.visible_mut() {
        let anchor = compute_anchor(entity, house, ctx)?;
        entity.set_auto_position(anchor);
    }

    let Some(mode) = relax else {
        return Ok(None);
    };
    let mut icons: Vec<&mut Entity> = catalog.visible_mut().filter(|e| !e.always_on).collect();
    Ok(Some(relax_overlaps(&mut icons, ctx.width(), ctx.height(), mode)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_with(names: &[&str]) -> (House, EntityCatalog) {
        let mut toml = String::new();
        for (i, name) in names.iter().enumerate() {
            toml.push_str(&format!(
                "[[furniture]]\nkind = \"piece\"\nid = \"p{}\"\nname = \"{}\"\nx = {}.0\ny = 0.0\nlight = true\n\n",
                i,
                name,
                i * 10
            ));
        }
        let house = House::from_toml(&toml).unwrap();
        let catalog = EntityCatalog::from_house(&house);
        (house, catalog)
    }

    #[test]
    fn test_java_string_hash() {
        assert_eq!(java_string_hash(""), 0);
        assert_eq!(java_string_hash("a"), 97);
        assert_eq!(java_string_hash("hello"), 99162322);
        assert_eq!(java_string_hash("hello world"), 1794106052);
    }

    #[test]
    fn test_relax_separates_coincident_icons() {
        let (_, mut catalog) = catalog_with(&["light.a", "light.b", "light.c"]);
        for e in catalog.lights.iter_mut() {
            e.set_auto_position(Point2::new(50.0, 50.0));
        }
        let mut icons: Vec<&mut Entity> = catalog.lights.iter_mut().collect();
        let outcome = relax_overlaps(&mut icons, 1000, 1000, ClusterMode::SingleLinkage);

        assert!(outcome.iterations <= MAX_RELAX_ITERATIONS);
        let p: Vec<Point2> = catalog.lights.iter().map(|e| e.position()).collect();
        assert_ne!(p[0], p[1]);
        assert_ne!(p[1], p[2]);
    }

    #[test]
    fn test_relax_is_deterministic() {
        let run = || {
            let (_, mut catalog) = catalog_with(&["light.a", "light.b"]);
            for e in catalog.lights.iter_mut() {
                e.set_auto_position(Point2::new(30.0, 30.0));
            }
            let mut icons: Vec<&mut Entity> = catalog.lights.iter_mut().collect();
            relax_overlaps(&mut icons, 800, 600, ClusterMode::SingleLinkage);
            catalog
                .lights
                .iter()
                .map(|e| e.position())
                .collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_relax_converges_for_pair() {
        let (_, mut catalog) = catalog_with(&["light.a", "light.b"]);
        catalog.lights[0].set_auto_position(Point2::new(50.0, 50.0));
        catalog.lights[1].set_auto_position(Point2::new(52.0, 50.0));
        let mut icons: Vec<&mut Entity> = catalog.lights.iter_mut().collect();
        let outcome = relax_overlaps(&mut icons, 1000, 1000, ClusterMode::UnionFind);

        assert!(outcome.converged);
        let a = to_pixels(catalog.lights[0].position(), 1000.0, 1000.0);
        let b = to_pixels(catalog.lights[1].position(), 1000.0, 1000.0);
        assert!(!intersects(a, b));
        assert!(catalog.lights[0].position().x < 50.0);
        assert!(catalog.lights[1].position().x > 52.0);
    }

    #[test]
    fn test_pinned_icon_never_moves() {
        let (_, mut catalog) = catalog_with(&["light.a", "light.b", "light.c"]);
        catalog.lights[0].pin(Point2::new(50.0, 50.0));
        catalog.lights[1].set_auto_position(Point2::new(50.0, 50.0));
        catalog.lights[2].set_auto_position(Point2::new(51.0, 50.5));
        let mut icons: Vec<&mut Entity> = catalog.lights.iter_mut().collect();
        let outcome = relax_overlaps(&mut icons, 640, 480, ClusterMode::SingleLinkage);

        assert!(outcome.iterations <= MAX_RELAX_ITERATIONS);
        assert_eq!(catalog.lights[0].position(), Point2::new(50.0, 50.0));
        assert_ne!(catalog.lights[1].position(), Point2::new(50.0, 50.0));
    }

    #[test]
    fn test_relax_stops_at_iteration_cap() {
        // Two pinned icons on top of each other can never separate
        let (_, mut catalog) = catalog_with(&["light.a", "light.b"]);
        catalog.lights[0].pin(Point2::new(10.0, 10.0));
        catalog.lights[1].pin(Point2::new(10.0, 10.0));
        let mut icons: Vec<&mut Entity> = catalog.lights.iter_mut().collect();
        let outcome = relax_overlaps(&mut icons, 640, 480, ClusterMode::SingleLinkage);
        assert_eq!(outcome.iterations, MAX_RELAX_ITERATIONS);
        assert!(!outcome.converged);
    }

    #[test]
    fn test_single_linkage_does_not_merge_clusters() {
        // 0-1 and 2-3 form separate pairs. In the bridged layout 6 links
        // both chains but joins only the first cluster it touches.
        let pixels = vec![
            Point2::new(0.0, 0.0),
            Point2::new(40.0, 0.0),
            Point2::new(200.0, 0.0),
            Point2::new(240.0, 0.0),
            Point2::new(120.0, 0.0),
        ];
        let single = single_linkage_clusters(&pixels);
        assert_eq!(single.len(), 2);

        let mut bridged = pixels.clone();
        bridged[4] = Point2::new(85.0, 0.0);
        bridged.push(Point2::new(160.0, 0.0));
        bridged.push(Point2::new(120.0, 0.0));
        let single = single_linkage_clusters(&bridged);
        let union = union_find_clusters(&bridged);
        assert!(single.len() > union.len());
        assert_eq!(union.len(), 1);
    }

    #[test]
    fn test_anchor_uses_top_surface_and_level() {
        let house = House::from_toml(
            r#"
selected_level = "upper"

[camera]
x = 0.0
y = 0.0
z = 1000.0
pitch = 1.5707963267948966
field_of_view = 1.5707963267948966

[[levels]]
id = "upper"
elevation = 300.0

[[furniture]]
kind = "piece"
id = "p1"
name = "light.lamp"
x = 100.0
y = 0.0
elevation = 50.0
height = 150.0
level = "upper"
light = true

[[furniture]]
kind = "piece"
id = "p2"
name = "light.lamp"
x = -100.0
y = 0.0
elevation = 50.0
height = 150.0
level = "upper"
light = true
"#,
        )
        .unwrap();
        let catalog = EntityCatalog::from_house(&house);
        let ctx = ProjectionContext::build(&house.camera, 100, 100).unwrap();
        let anchor = compute_anchor(&catalog.lights[0], &house, &ctx).unwrap();
        // Two pieces mirrored around the camera average to the center
        assert!((anchor.x - 50.0).abs() < 1e-9);
        assert!((anchor.y - 50.0).abs() < 1e-9);

        // Top surface at 500 is 500 below the camera: 100 units map to 10%
        let single = ctx
            .project_to_viewport_percent(WorldPoint::new(100.0, 0.0, 500.0))
            .unwrap();
        assert!(((single.x - 50.0).abs() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_anchor_fails_on_missing_level() {
        let mut house = House::default();
        house.furniture.push(lumaplan_core::FurnitureNode::Piece(lumaplan_core::Piece {
            id: "p1".into(),
            name: "light.ghost".into(),
            x: 0.0,
            y: 0.0,
            elevation: 0.0,
            height: 0.0,
            level: Some("basement".into()),
            visible: true,
            light: true,
            power: 0.5,
        }));
        house.all_levels_visible = true;
        let catalog = EntityCatalog::from_house(&house);
        let ctx = ProjectionContext::build(&house.camera, 100, 100).unwrap();
        let err = compute_anchor(&catalog.lights[0], &house, &ctx).unwrap_err();
        assert!(matches!(err, LumaplanError::LevelNotFound(_)));
    }
}
