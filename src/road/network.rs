use super::lane::{LaneIndex, StraightLane, DEFAULT_WIDTH};
use crate::math::Point2d;
use crate::Error;
use smallvec::SmallVec;

/// The start node of the straight road segment.
const START_NODE: &str = "0";

/// The end node of the straight road segment.
const END_NODE: &str = "1";

/// A road network made up of straight, parallel lanes between two nodes.
#[derive(Clone, Debug)]
pub struct RoadNetwork {
    /// The lanes, ordered left to right.
    lanes: Vec<StraightLane>,
}

impl RoadNetwork {
    /// Creates a straight road of `lanes_count` adjacent lanes, starting at the origin
    /// and running in the +x direction. Lane `i` is centred on `y = i * DEFAULT_WIDTH`.
    pub fn straight_road_network(lanes_count: usize, length: f64, speed_limit: f64) -> Self {
        let lanes = (0..lanes_count)
            .map(|id| {
                let y = id as f64 * DEFAULT_WIDTH;
                StraightLane::new(
                    LaneIndex::new(START_NODE, END_NODE, id),
                    Point2d::new(0.0, y),
                    Point2d::new(length, y),
                    DEFAULT_WIDTH,
                    speed_limit,
                )
            })
            .collect();
        Self { lanes }
    }

    /// Gets the lane with the given index.
    pub fn get_lane(&self, index: LaneIndex) -> Result<&StraightLane, Error> {
        self.lanes
            .iter()
            .find(|lane| lane.index() == index)
            .ok_or(Error::UnknownLane(index))
    }

    /// Gets the `id`th lane of the road segment.
    pub fn lane_by_id(&self, id: usize) -> Result<&StraightLane, Error> {
        self.get_lane(LaneIndex::new(START_NODE, END_NODE, id))
    }

    /// Returns an iterator over all the lanes, left to right.
    pub fn lanes(&self) -> impl Iterator<Item = &StraightLane> {
        self.lanes.iter()
    }

    /// The number of lanes in the road segment.
    pub fn lanes_count(&self) -> usize {
        self.lanes.len()
    }

    /// All lanes running between the same nodes as the given lane, including itself.
    pub fn all_side_lanes(&self, index: LaneIndex) -> SmallVec<[LaneIndex; 4]> {
        self.lanes
            .iter()
            .map(StraightLane::index)
            .filter(|other| other.from == index.from && other.to == index.to)
            .collect()
    }

    /// Finds the lane closest to the given point.
    /// Ties are broken in favour of the leftmost lane.
    pub fn closest_lane_index(&self, point: Point2d) -> LaneIndex {
        self.lanes
            .iter()
            .map(|lane| (lane.index(), lane.distance(point)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
            .expect("Road network has no lanes")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn lanes_are_ordered_left_to_right() {
        let network = RoadNetwork::straight_road_network(4, 1000.0, 30.0);
        assert_eq!(network.lanes_count(), 4);
        let ys = network
            .lanes()
            .map(|lane| lane.position(0.0, 0.0).y)
            .collect::<Vec<_>>();
        assert_eq!(ys, vec![0.0, 4.0, 8.0, 12.0]);
    }

    #[test]
    fn side_lanes_include_self() {
        let network = RoadNetwork::straight_road_network(4, 1000.0, 30.0);
        let lane = network.lane_by_id(2).unwrap().index();
        assert_eq!(network.all_side_lanes(lane).len(), 4);
    }

    #[test]
    fn closest_lane() {
        let network = RoadNetwork::straight_road_network(4, 1000.0, 30.0);
        assert_eq!(network.closest_lane_index(Point2d::new(50.0, 7.0)).id, 2);
        assert_eq!(network.closest_lane_index(Point2d::new(50.0, -3.0)).id, 0);
        assert_eq!(network.closest_lane_index(Point2d::new(50.0, 2.0)).id, 0);
    }

    #[test]
    fn unknown_lane_is_an_error() {
        let network = RoadNetwork::straight_road_network(4, 1000.0, 30.0);
        assert!(matches!(network.lane_by_id(4), Err(Error::UnknownLane(_))));
    }
}
