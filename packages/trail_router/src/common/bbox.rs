//! Defines a struct to represent a bounding box, which is used to represent
//! the area currently visible on the map. Trail data is always requested for
//! a bounding box, so this also knows which data partitions it touches.

use serde::{Deserialize, Serialize};

/// Largest extent a bounding box may have along either axis, in degrees.
/// Anything bigger is far beyond a walking-scale map view.
pub const MAX_SPAN_DEGREES: f64 = 1.0;

/// A bounding box for geographical data. Contains the southern and northern
/// latitudes & the western and eastern longitudes, defining a 'rectangle' on
/// the surface of the Earth
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BBox {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        BBox {
            south,
            west,
            north,
            east,
        }
    }

    /// A bounding box is only usable if its edges are finite, within range
    /// and correctly ordered, and it covers no more than MAX_SPAN_DEGREES in
    /// each direction
    pub fn is_valid(&self) -> bool {
        let finite = [self.south, self.west, self.north, self.east]
            .iter()
            .all(|val| val.is_finite());

        finite
            && (-90.0..=90.0).contains(&self.south)
            && (-90.0..=90.0).contains(&self.north)
            && (-180.0..=180.0).contains(&self.west)
            && (-180.0..=180.0).contains(&self.east)
            && self.south < self.north
            && self.west < self.east
            && self.north - self.south <= MAX_SPAN_DEGREES
            && self.east - self.west <= MAX_SPAN_DEGREES
    }

    /// Convert a latitude & longitude into a partition string, which can be
    /// used when querying data from postgres. Each partition covers a single
    /// degree of latitude and longitude.
    fn get_ptn_from_coords(lat: f64, lon: f64) -> String {
        let lat_i = lat.floor() as i32;
        let lon_i = lon.floor() as i32;
        let ptn = format!("'{}_{}'", lat_i, lon_i);
        ptn.replace('-', "n")
    }

    /// Get a list of all of the partitions which contain data for this
    /// bounding box. Valid boxes touch at most four partitions.
    /// Please note that partitions are returned wrapped in single quotes, as
    /// it is anticipated that they will be used directly in SQL queries
    pub fn get_partition_list(&self) -> Vec<String> {
        let mut ptn_list = Vec::new();

        let lat_range = (self.south.floor() as i32)..=(self.north.floor() as i32);
        for lat in lat_range {
            let lon_range =
                (self.west.floor() as i32)..=(self.east.floor() as i32);
            for lon in lon_range {
                ptn_list.push(BBox::get_ptn_from_coords(lat as f64, lon as f64));
            }
        }

        ptn_list
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    /// A viewport sitting inside a single partition
    #[test]
    fn test_partition_list_single() {
        let bbox = BBox::new(50.95, -1.42, 50.99, -1.33);

        let result = bbox.get_partition_list();

        assert_eq!(result, vec!["'50_n2'".to_string()]);
    }

    /// An edge lying exactly on a whole degree also pulls in the partition
    /// on the far side, as nodes on the line are stored there
    #[test]
    fn test_partition_list_edge_on_boundary() {
        let bbox = BBox::new(50.95, -1.42, 51.0, -1.33);

        let result = bbox.get_partition_list();

        let target: Vec<String> = vec!["'50_n2'".to_string(), "'51_n2'".to_string()];

        assert_eq!(result, target);
    }

    /// A viewport straddling a partition boundary on both axes
    #[test]
    fn test_partition_list_corner() {
        let bbox = BBox::new(50.95, -0.05, 51.05, 0.05);

        let result = bbox.get_partition_list();

        let target: Vec<String> = vec![
            "'50_n1'".to_string(),
            "'50_0'".to_string(),
            "'51_n1'".to_string(),
            "'51_0'".to_string(),
        ];

        assert_eq!(result, target);
    }

    #[cfg(test)]
    mod test_is_valid {
        use super::*;

        #[test]
        fn test_valid() {
            assert!(BBox::new(50.0, 10.0, 50.1, 10.1).is_valid());
        }

        #[test]
        fn test_inverted() {
            assert!(!BBox::new(50.1, 10.0, 50.0, 10.1).is_valid());
            assert!(!BBox::new(50.0, 10.1, 50.1, 10.0).is_valid());
        }

        #[test]
        fn test_out_of_range() {
            assert!(!BBox::new(89.0, 10.0, 91.0, 10.1).is_valid());
            assert!(!BBox::new(50.0, 10.0, f64::NAN, 10.1).is_valid());
        }

        /// Boxes far larger than a map view would load whole regions
        #[test]
        fn test_too_large() {
            assert!(BBox::new(50.0, 10.0, 51.0, 11.0).is_valid());
            assert!(!BBox::new(50.0, 10.0, 51.5, 10.1).is_valid());
            assert!(!BBox::new(-60.0, -120.0, 60.0, 120.0).is_valid());
        }
    }
}
