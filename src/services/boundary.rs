//! Osmosis polygon filter files (`.poly`).
//!
//! ```text
//! santiago
//! 1
//!    -70.80  -33.30
//!    -70.50  -33.30
//!    -70.50  -33.60
//! END
//! !2
//!    ...hole...
//! END
//! END
//! ```

use crate::domain::models::BoundarySummary;
use crate::error::{PipelineError, PipelineResult};
use geo::{BoundingRect, Intersects, LineString, MultiPolygon, Point, Polygon};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub name: String,
    pub hole: bool,
    /// `(lon, lat)` pairs; the closing vertex is implicit.
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub name: String,
    pub rings: Vec<Ring>,
    /// Outer rings with their holes punched out.
    pub area: MultiPolygon<f64>,
}

impl Boundary {
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let raw = std::fs::read(path).map_err(|e| PipelineError::fs(path, e))?;
        let text = String::from_utf8(raw).map_err(|_| {
            PipelineError::Conversion(format!("{}: polygon file is not UTF-8", path.display()))
        })?;
        Self::parse(&text)
            .map_err(|e| PipelineError::Conversion(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(text: &str) -> Result<Self, String> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let name = match lines.next() {
            Some((_, l)) => l.to_string(),
            None => return Err("empty polygon file".into()),
        };

        let mut rings = Vec::new();
        loop {
            let (_, header) = lines
                .next()
                .ok_or_else(|| "missing final END".to_string())?;
            if header == "END" {
                break;
            }
            let (hole, ring_name) = match header.strip_prefix('!') {
                Some(rest) => (true, rest.to_string()),
                None => (false, header.to_string()),
            };
            let mut points = Vec::new();
            loop {
                let (lineno, line) = lines
                    .next()
                    .ok_or_else(|| format!("section {ring_name:?} has no END"))?;
                if line == "END" {
                    break;
                }
                points.push(parse_vertex(lineno, line)?);
            }
            rings.push(Ring {
                name: ring_name,
                hole,
                points,
            });
        }

        if let Some((lineno, _)) = lines.next() {
            return Err(format!("unexpected content after final END at line {lineno}"));
        }

        validate(&rings)?;
        let area = assemble(&rings);
        Ok(Boundary { name, rings, area })
    }

    /// `[min_lon, min_lat, max_lon, max_lat]` over the outer rings.
    pub fn bbox(&self) -> [f64; 4] {
        self.area
            .bounding_rect()
            .map(|r| [r.min().x, r.min().y, r.max().x, r.max().y])
            .unwrap_or_default()
    }

    pub fn summary(&self) -> BoundarySummary {
        BoundarySummary {
            name: self.name.clone(),
            rings: self.rings.iter().filter(|r| !r.hole).count(),
            holes: self.rings.iter().filter(|r| r.hole).count(),
            vertices: self.rings.iter().map(|r| r.points.len()).sum(),
            bbox: self.bbox(),
        }
    }
}

fn parse_vertex(lineno: usize, line: &str) -> Result<(f64, f64), String> {
    let mut parts = line.split_whitespace();
    let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("line {lineno}: expected \"lon lat\", got {line:?}"));
    };
    let lon: f64 = lon
        .parse()
        .map_err(|_| format!("line {lineno}: bad longitude {lon:?}"))?;
    let lat: f64 = lat
        .parse()
        .map_err(|_| format!("line {lineno}: bad latitude {lat:?}"))?;
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
        return Err(format!("line {lineno}: longitude {lon} out of range"));
    }
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(format!("line {lineno}: latitude {lat} out of range"));
    }
    Ok((lon, lat))
}

fn validate(rings: &[Ring]) -> Result<(), String> {
    if !rings.iter().any(|r| !r.hole) {
        return Err("polygon has no outer ring".into());
    }
    for ring in rings {
        if ring.points.len() < 3 {
            return Err(format!(
                "ring {:?} has {} vertices, need at least 3",
                ring.name,
                ring.points.len()
            ));
        }
    }
    Ok(())
}

// Each hole is attached to the first outer ring touching its first vertex.
fn assemble(rings: &[Ring]) -> MultiPolygon<f64> {
    let mut outers: Vec<Polygon<f64>> = rings
        .iter()
        .filter(|r| !r.hole)
        .map(|r| Polygon::new(LineString::from(r.points.clone()), vec![]))
        .collect();
    for hole in rings.iter().filter(|r| r.hole) {
        let first = Point::from(hole.points[0]);
        match outers.iter_mut().find(|p| p.intersects(&first)) {
            Some(outer) => outer.interiors_push(LineString::from(hole.points.clone())),
            None => tracing::warn!(ring = %hole.name, "hole lies outside every outer ring; ignored"),
        }
    }
    MultiPolygon::new(outers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Contains;

    const SQUARE_WITH_HOLE: &str = "test\n\
1\n\
   -71.0   -34.0\n\
   -70.0   -34.0\n\
   -70.0   -33.0\n\
   -71.0   -33.0\n\
END\n\
!2\n\
   -70.6   -33.6\n\
   -70.4   -33.6\n\
   -70.4   -33.4\n\
   -70.6   -33.4\n\
END\n\
END\n";

    #[test]
    fn parses_rings_and_holes() {
        let b = Boundary::parse(SQUARE_WITH_HOLE).unwrap();
        assert_eq!(b.name, "test");
        assert_eq!(b.rings.len(), 2);
        assert!(!b.rings[0].hole);
        assert!(b.rings[1].hole);
        assert_eq!(b.rings[1].name, "2");
        assert_eq!(b.summary().vertices, 8);
        assert_eq!(b.bbox(), [-71.0, -34.0, -70.0, -33.0]);
    }

    #[test]
    fn containment_respects_holes() {
        let b = Boundary::parse(SQUARE_WITH_HOLE).unwrap();
        assert_eq!(b.area.0.len(), 1);
        assert_eq!(b.area.0[0].interiors().len(), 1);
        assert!(b.area.contains(&Point::new(-70.9, -33.1)));
        assert!(!b.area.contains(&Point::new(-70.5, -33.5)));
        assert!(!b.area.contains(&Point::new(-69.5, -33.5)));
        assert!(!b.area.contains(&Point::new(-70.5, -35.0)));
    }

    #[test]
    fn holes_attach_to_their_own_outer_ring() {
        let text = "two\n\
1\n-71 -34\n-70 -34\n-70 -33\n-71 -33\nEND\n\
2\n-69 -34\n-68 -34\n-68 -33\n-69 -33\nEND\n\
!3\n-68.6 -33.6\n-68.4 -33.6\n-68.4 -33.4\n-68.6 -33.4\nEND\n\
!4\n10 10\n11 10\n11 11\nEND\n\
END\n";
        let b = Boundary::parse(text).unwrap();
        assert_eq!(b.area.0[0].interiors().len(), 0);
        assert_eq!(b.area.0[1].interiors().len(), 1);
        assert!(b.area.contains(&Point::new(-70.5, -33.5)));
        assert!(!b.area.contains(&Point::new(-68.5, -33.5)));
        assert!(b.area.contains(&Point::new(-68.9, -33.1)));
        assert_eq!(b.bbox(), [-71.0, -34.0, -68.0, -33.0]);
        assert_eq!(b.summary().holes, 2);
    }

    #[test]
    fn accepts_scientific_notation_and_tabs() {
        let text = "polygon\n1\n\t-7.1E+01\t-3.4E+01\n\t-7.0E+01\t-3.4E+01\n\t-7.0E+01\t-3.3E+01\nEND\nEND\n";
        let b = Boundary::parse(text).unwrap();
        assert_eq!(b.rings[0].points[0], (-71.0, -34.0));
    }

    #[test]
    fn empty_body_is_rejected() {
        assert!(Boundary::parse("").is_err());
        assert!(Boundary::parse("\n  \n").is_err());
    }

    #[test]
    fn service_error_bodies_are_rejected() {
        assert!(Boundary::parse("None\n").is_err());
        assert!(Boundary::parse("<html>\n<body>Internal Server Error</body>\n</html>\n").is_err());
    }

    #[test]
    fn structural_errors_are_rejected() {
        // missing final END
        assert!(Boundary::parse("p\n1\n0 0\n1 0\n1 1\nEND\n").is_err());
        // too few vertices
        assert!(Boundary::parse("p\n1\n0 0\n1 1\nEND\nEND\n").is_err());
        // only a hole
        assert!(Boundary::parse("p\n!1\n0 0\n1 0\n1 1\nEND\nEND\n").is_err());
        // out of range
        assert!(Boundary::parse("p\n1\n0 0\n200 0\n1 1\nEND\nEND\n").is_err());
        // trailing garbage
        assert!(Boundary::parse("p\n1\n0 0\n1 0\n1 1\nEND\nEND\nextra\n").is_err());
    }

    #[test]
    fn load_reports_conversion_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let p = tmp.path().join("santiago.poly");
        std::fs::write(&p, "").unwrap();
        assert_eq!(Boundary::load(&p).unwrap_err().kind(), "conversion");
    }
}
