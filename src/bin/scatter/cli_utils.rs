use glam::Vec3;
use strewn::errors::{StrewnError, StrewnResult};
use strewn::FieldExtent;

/// Generic parser for delimited strings that return fixed-size arrays
pub fn parse_delimited<T, const N: usize>(
    input: &str,
    delimiter: char,
    type_name: &str,
    parser: impl Fn(&str) -> Result<T, std::num::ParseFloatError>,
) -> StrewnResult<[T; N]>
where
    T: Copy + Default,
{
    let parts: Vec<&str> = input.split(delimiter).collect();
    if parts.len() != N {
        return Err(StrewnError::InvalidConfig {
            reason: format!(
                "Invalid {type_name} format '{input}'. Expected {N} {delimiter}-separated values"
            ),
        });
    }

    let mut result = [T::default(); N];
    for (i, part) in parts.iter().enumerate() {
        result[i] = parser(part).map_err(|_| StrewnError::InvalidConfig {
            reason: format!("Invalid {type_name} value: '{part}'"),
        })?;
    }

    Ok(result)
}

/// Parse resolution string "WIDTHxLENGTH" with validation
pub fn parse_resolution(resolution_str: &str) -> StrewnResult<(u32, u32)> {
    let [width, length] =
        parse_delimited::<f32, 2>(resolution_str, 'x', "resolution", |s| s.parse())?;
    let (width, length) = (width as u32, length as u32);

    if width < 2 || length < 2 {
        return Err(StrewnError::InvalidConfig {
            reason: "Resolution must be at least 2 samples per side".to_string(),
        });
    }

    if width > 4096 || length > 4096 {
        return Err(StrewnError::InvalidConfig {
            reason: "Resolution must not exceed 4096 samples per side".to_string(),
        });
    }

    Ok((width, length))
}

/// Parse extent string "WIDTHxLENGTH" into a world footprint
pub fn parse_extent(extent_str: &str, origin_y: f32, height_scale: f32) -> StrewnResult<FieldExtent> {
    let [width, length] = parse_delimited::<f32, 2>(extent_str, 'x', "extent", |s| s.parse())?;

    let extent = FieldExtent::new(width, length, origin_y, height_scale);
    if extent.is_degenerate() {
        return Err(StrewnError::InvalidConfig {
            reason: format!(
                "Extent {width}x{length} with relief {height_scale} does not describe a usable field"
            ),
        });
    }

    Ok(extent)
}

/// Parse position string "X,Y,Z"
pub fn parse_position(pos_str: &str) -> StrewnResult<Vec3> {
    let [x, y, z] = parse_delimited::<f32, 3>(pos_str, ',', "position", |s| s.parse())?;
    Ok(Vec3::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolution() {
        assert_eq!(parse_resolution("128x128").unwrap(), (128, 128));
        assert_eq!(parse_resolution("64x256").unwrap(), (64, 256));

        assert!(parse_resolution("128").is_err());
        assert!(parse_resolution("1x128").is_err());
        assert!(parse_resolution("8192x64").is_err());
        assert!(parse_resolution("axb").is_err());
    }

    #[test]
    fn test_parse_extent() {
        let extent = parse_extent("400x300", 0.0, 60.0).unwrap();
        assert_eq!(extent.width, 400.0);
        assert_eq!(extent.length, 300.0);
        assert_eq!(extent.height_scale, 60.0);

        assert!(parse_extent("400", 0.0, 60.0).is_err());
        assert!(parse_extent("0x300", 0.0, 60.0).is_err());
        assert!(parse_extent("400x300", 0.0, -5.0).is_err());
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(
            parse_position("0.0,1.0,0.0").unwrap(),
            Vec3::new(0.0, 1.0, 0.0)
        );
        assert_eq!(
            parse_position("200,0,150.5").unwrap(),
            Vec3::new(200.0, 0.0, 150.5)
        );

        assert!(parse_position("1,2").is_err());
        assert!(parse_position("1,2,three").is_err());
    }
}
