use anyhow::{bail, Context, Result};
use landuse_core::Coordinate;

/// Parses `"x,y;x,y;..."` into coordinates.
///
/// Whitespace around numbers and a trailing `;` are accepted. Ring validity
/// is left to the client, which rejects it before any request.
pub fn parse_coordinates(input: &str) -> Result<Vec<Coordinate>> {
    let mut points = Vec::new();
    for (index, pair) in input.split(';').enumerate() {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }
        let Some((x, y)) = pair.split_once(',') else {
            bail!("point {} ('{}') must be written as x,y", index + 1, pair);
        };
        let x: f64 = x
            .trim()
            .parse()
            .with_context(|| format!("invalid x in point {} ('{}')", index + 1, pair))?;
        let y: f64 = y
            .trim()
            .parse()
            .with_context(|| format!("invalid y in point {} ('{}')", index + 1, pair))?;
        points.push(Coordinate::new(x, y));
    }
    if points.is_empty() {
        bail!("geometry must contain at least one point");
    }
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_square() {
        let points = parse_coordinates("0,0; 0,1 ;1,1;1,0;").unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points[1], Coordinate::new(0.0, 1.0));
    }

    #[test]
    fn test_parse_negative_and_fractional() {
        let points = parse_coordinates("-1.5,2.25;3,-4").unwrap();
        assert_eq!(points, vec![Coordinate::new(-1.5, 2.25), Coordinate::new(3.0, -4.0)]);
    }

    #[test]
    fn test_parse_rejects_malformed_points() {
        assert!(parse_coordinates("").is_err());
        assert!(parse_coordinates("1 2;3,4").is_err());
        assert!(parse_coordinates("a,1").is_err());
        assert!(parse_coordinates("1,b").is_err());
    }
}
