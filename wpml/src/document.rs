// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The bfp developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Serde structs that mirror the WPML template document.
//!
//! The types map directly to the XML nesting of a `template.kml` as written
//! by the DJI Pilot waypoint template, with namespace-qualified element
//! names. Field order matters: serde serializes struct fields in declaration
//! order and the consumer expects the vendor's ordering.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default KML namespace.
pub const KML_NS: &str = "http://www.opengis.net/kml/2.2";

/// WPML extension namespace.
pub const WPML_NS: &str = "http://www.dji.com/wpmz/1.0.3";

/// Root element of a WPML template document.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct MissionDocument {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "@xmlns:wpml")]
    pub xmlns_wpml: String,

    #[serde(rename = "Document")]
    pub document: Document,
}

impl MissionDocument {
    /// Wraps a `Document` with the KML and WPML namespace declarations.
    pub fn new(document: Document) -> Self {
        Self {
            xmlns: KML_NS.to_string(),
            xmlns_wpml: WPML_NS.to_string(),
            document,
        }
    }

    /// The placemarks of the single mission folder.
    pub fn placemarks(&self) -> &[Placemark] {
        &self.document.folder.placemarks
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Document {
    /// Creation time in milliseconds since the Unix epoch. Optional so that
    /// deterministic writers can omit wall-clock state.
    #[serde(rename(serialize = "wpml:createTime", deserialize = "createTime"), skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,

    #[serde(rename(serialize = "wpml:updateTime", deserialize = "updateTime"), skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,

    #[serde(rename(serialize = "wpml:missionConfig", deserialize = "missionConfig"))]
    pub mission_config: MissionConfig,

    #[serde(rename = "Folder")]
    pub folder: Folder,
}

/// Global mission parameters.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct MissionConfig {
    #[serde(rename(serialize = "wpml:flyToWaylineMode", deserialize = "flyToWaylineMode"))]
    pub fly_to_wayline_mode: String,

    #[serde(rename(serialize = "wpml:finishAction", deserialize = "finishAction"))]
    pub finish_action: String,

    #[serde(rename(serialize = "wpml:exitOnRCLost", deserialize = "exitOnRCLost"))]
    pub exit_on_rc_lost: String,

    /// Takeoff reference point as `lat,lon`.
    #[serde(rename(serialize = "wpml:takeOffRefPoint", deserialize = "takeOffRefPoint"))]
    pub take_off_ref_point: String,

    #[serde(rename(serialize = "wpml:takeOffRefPointAGLHeight", deserialize = "takeOffRefPointAGLHeight"))]
    pub take_off_ref_point_agl_height: f64,

    #[serde(rename(serialize = "wpml:takeOffSecurityHeight", deserialize = "takeOffSecurityHeight"))]
    pub take_off_security_height: f64,

    #[serde(rename(serialize = "wpml:globalTransitionalSpeed", deserialize = "globalTransitionalSpeed"))]
    pub global_transitional_speed: f64,

    #[serde(rename(serialize = "wpml:droneInfo", deserialize = "droneInfo"))]
    pub drone_info: DroneInfo,

    #[serde(rename(serialize = "wpml:payloadInfo", deserialize = "payloadInfo"))]
    pub payload_info: PayloadInfo,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            fly_to_wayline_mode: "safely".to_string(),
            finish_action: "goHome".to_string(),
            exit_on_rc_lost: "goContinue".to_string(),
            take_off_ref_point: String::new(),
            take_off_ref_point_agl_height: 0.0,
            take_off_security_height: 30.0,
            global_transitional_speed: 0.2,
            drone_info: DroneInfo::default(),
            payload_info: PayloadInfo::default(),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct DroneInfo {
    #[serde(rename(serialize = "wpml:droneEnumValue", deserialize = "droneEnumValue"))]
    pub drone_enum_value: u32,

    #[serde(rename(serialize = "wpml:droneSubEnumValue", deserialize = "droneSubEnumValue"))]
    pub drone_sub_enum_value: u32,
}

impl Default for DroneInfo {
    fn default() -> Self {
        // M350 RTK
        Self {
            drone_enum_value: 77,
            drone_sub_enum_value: 0,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct PayloadInfo {
    #[serde(rename(serialize = "wpml:payloadEnumValue", deserialize = "payloadEnumValue"))]
    pub payload_enum_value: u32,

    #[serde(rename(serialize = "wpml:payloadSubEnumValue", deserialize = "payloadSubEnumValue"))]
    pub payload_sub_enum_value: u32,

    #[serde(rename(serialize = "wpml:payloadPositionIndex", deserialize = "payloadPositionIndex"))]
    pub payload_position_index: u32,
}

impl Default for PayloadInfo {
    fn default() -> Self {
        // Zenmuse L1
        Self {
            payload_enum_value: 66,
            payload_sub_enum_value: 0,
            payload_position_index: 0,
        }
    }
}

/// The single waypoint folder of a template document.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Folder {
    #[serde(rename(serialize = "wpml:templateType", deserialize = "templateType"))]
    pub template_type: String,

    #[serde(rename(serialize = "wpml:templateId", deserialize = "templateId"))]
    pub template_id: u32,

    #[serde(rename(serialize = "wpml:waylineCoordinateSysParam", deserialize = "waylineCoordinateSysParam"))]
    pub coordinate_sys_param: CoordinateSysParam,

    #[serde(rename(serialize = "wpml:autoFlightSpeed", deserialize = "autoFlightSpeed"))]
    pub auto_flight_speed: f64,

    #[serde(rename(serialize = "wpml:globalHeight", deserialize = "globalHeight"))]
    pub global_height: f64,

    #[serde(rename(serialize = "wpml:caliFlightEnable", deserialize = "caliFlightEnable"))]
    pub cali_flight_enable: u8,

    #[serde(rename(serialize = "wpml:gimbalPitchMode", deserialize = "gimbalPitchMode"))]
    pub gimbal_pitch_mode: String,

    #[serde(rename(serialize = "wpml:globalWaypointHeadingParam", deserialize = "globalWaypointHeadingParam"))]
    pub global_waypoint_heading_param: GlobalWaypointHeadingParam,

    #[serde(rename(serialize = "wpml:globalWaypointTurnMode", deserialize = "globalWaypointTurnMode"))]
    pub global_waypoint_turn_mode: String,

    #[serde(rename(serialize = "wpml:globalUseStraightLine", deserialize = "globalUseStraightLine"))]
    pub global_use_straight_line: u8,

    #[serde(rename = "Placemark", default)]
    pub placemarks: Vec<Placemark>,

    #[serde(rename(serialize = "wpml:payloadParam", deserialize = "payloadParam"))]
    pub payload_param: PayloadParam,
}

impl Default for Folder {
    fn default() -> Self {
        Self {
            template_type: "waypoint".to_string(),
            template_id: 0,
            coordinate_sys_param: CoordinateSysParam::default(),
            auto_flight_speed: 2.0,
            global_height: 100.0,
            cali_flight_enable: 0,
            gimbal_pitch_mode: "manual".to_string(),
            global_waypoint_heading_param: GlobalWaypointHeadingParam::default(),
            global_waypoint_turn_mode: TurnMode::CoordinateTurn.as_str().to_string(),
            global_use_straight_line: 1,
            placemarks: Vec::new(),
            payload_param: PayloadParam::default(),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct CoordinateSysParam {
    #[serde(rename(serialize = "wpml:coordinateMode", deserialize = "coordinateMode"))]
    pub coordinate_mode: String,

    #[serde(rename(serialize = "wpml:heightMode", deserialize = "heightMode"))]
    pub height_mode: String,

    #[serde(rename(serialize = "wpml:positioningType", deserialize = "positioningType"))]
    pub positioning_type: String,
}

impl Default for CoordinateSysParam {
    fn default() -> Self {
        Self {
            coordinate_mode: "WGS84".to_string(),
            height_mode: "EGM96".to_string(),
            positioning_type: "GPS".to_string(),
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct GlobalWaypointHeadingParam {
    #[serde(rename(serialize = "wpml:waypointHeadingMode", deserialize = "waypointHeadingMode"))]
    pub waypoint_heading_mode: String,

    #[serde(rename(serialize = "wpml:waypointHeadingAngle", deserialize = "waypointHeadingAngle"))]
    pub waypoint_heading_angle: f64,

    #[serde(rename(serialize = "wpml:waypointPoiPoint", deserialize = "waypointPoiPoint"))]
    pub waypoint_poi_point: String,

    #[serde(rename(serialize = "wpml:waypointHeadingPoiIndex", deserialize = "waypointHeadingPoiIndex"))]
    pub waypoint_heading_poi_index: u32,
}

impl Default for GlobalWaypointHeadingParam {
    fn default() -> Self {
        Self {
            waypoint_heading_mode: "manually".to_string(),
            waypoint_heading_angle: 0.0,
            waypoint_poi_point: "0.000000,0.000000,0.000000".to_string(),
            waypoint_heading_poi_index: 0,
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct PayloadParam {
    #[serde(rename(serialize = "wpml:payloadPositionIndex", deserialize = "payloadPositionIndex"))]
    pub payload_position_index: u32,

    #[serde(rename(serialize = "wpml:meteringMode", deserialize = "meteringMode"))]
    pub metering_mode: String,

    #[serde(rename(serialize = "wpml:dewarpingEnable", deserialize = "dewarpingEnable"))]
    pub dewarping_enable: u8,

    #[serde(rename(serialize = "wpml:returnMode", deserialize = "returnMode"))]
    pub return_mode: String,

    #[serde(rename(serialize = "wpml:samplingRate", deserialize = "samplingRate"))]
    pub sampling_rate: u32,

    #[serde(rename(serialize = "wpml:scanningMode", deserialize = "scanningMode"))]
    pub scanning_mode: String,

    #[serde(rename(serialize = "wpml:modelColoringEnable", deserialize = "modelColoringEnable"))]
    pub model_coloring_enable: u8,
}

impl Default for PayloadParam {
    fn default() -> Self {
        Self {
            payload_position_index: 0,
            metering_mode: "average".to_string(),
            dewarping_enable: 0,
            return_mode: "singleReturnStrongest".to_string(),
            sampling_rate: 240_000,
            scanning_mode: "nonRepetitive".to_string(),
            model_coloring_enable: 0,
        }
    }
}

/// A single waypoint placemark.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Placemark {
    #[serde(rename = "Point")]
    pub point: Point,

    #[serde(rename(serialize = "wpml:index", deserialize = "index"))]
    pub index: u32,

    #[serde(rename(serialize = "wpml:ellipsoidHeight", deserialize = "ellipsoidHeight"))]
    pub ellipsoid_height: f64,

    #[serde(rename(serialize = "wpml:height", deserialize = "height"))]
    pub height: f64,

    #[serde(rename(serialize = "wpml:useGlobalHeight", deserialize = "useGlobalHeight"))]
    pub use_global_height: u8,

    #[serde(rename(serialize = "wpml:useGlobalSpeed", deserialize = "useGlobalSpeed"))]
    pub use_global_speed: u8,

    #[serde(rename(serialize = "wpml:waypointSpeed", deserialize = "waypointSpeed"))]
    pub waypoint_speed: f64,

    #[serde(rename(serialize = "wpml:useGlobalHeadingParam", deserialize = "useGlobalHeadingParam"))]
    pub use_global_heading_param: u8,

    #[serde(rename(serialize = "wpml:useGlobalTurnParam", deserialize = "useGlobalTurnParam"))]
    pub use_global_turn_param: u8,

    #[serde(rename(serialize = "wpml:useStraightLine", deserialize = "useStraightLine"))]
    pub use_straight_line: u8,

    #[serde(rename(serialize = "wpml:isRisky", deserialize = "isRisky"))]
    pub is_risky: u8,
}

impl Placemark {
    /// Creates a placemark at `(lon, lat, height)` with per-waypoint speed
    /// and height, using the folder's global heading and turn parameters.
    pub fn new(index: u32, lon: f64, lat: f64, height: f64, speed: f64) -> Self {
        Self {
            point: Point::from_lon_lat_height(lon, lat, height),
            index,
            ellipsoid_height: height,
            height,
            use_global_height: 0,
            use_global_speed: 0,
            waypoint_speed: speed,
            use_global_heading_param: 1,
            use_global_turn_param: 1,
            use_straight_line: 1,
            is_risky: 0,
        }
    }

    /// The `(lon, lat, height)` tuple parsed from the coordinate string.
    pub fn coordinate(&self) -> Result<(f64, f64, f64), Error> {
        self.point.coordinate()
    }
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Point {
    /// `lon,lat,height` as in KML.
    #[serde(rename = "coordinates")]
    pub coordinates: String,
}

impl Point {
    pub fn from_lon_lat_height(lon: f64, lat: f64, height: f64) -> Self {
        Self {
            coordinates: format!("{lon},{lat},{height}"),
        }
    }

    pub fn coordinate(&self) -> Result<(f64, f64, f64), Error> {
        let mut parts = self.coordinates.trim().split(',').map(|p| {
            p.trim().parse::<f64>().map_err(|_| Error::InvalidValue {
                field: "coordinates",
                value: self.coordinates.clone(),
            })
        });

        match (parts.next(), parts.next(), parts.next()) {
            (Some(lon), Some(lat), Some(height)) => Ok((lon?, lat?, height?)),
            _ => Err(Error::InvalidValue {
                field: "coordinates",
                value: self.coordinates.clone(),
            }),
        }
    }
}

/// Waypoint turn behaviour understood by the wayline executor.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum TurnMode {
    /// Fly a spline through the waypoint without stopping.
    CoordinateTurn,
    /// Fly to the waypoint, stop, then turn.
    ToPointAndStopWithDiscontinuityCurvature,
}

impl TurnMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CoordinateTurn => "coordinateTurn",
            Self::ToPointAndStopWithDiscontinuityCurvature => {
                "toPointAndStopWithDiscontinuityCurvature"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_round_trip() {
        let point = Point::from_lon_lat_height(4.3671234, 50.8412345, 12.5);
        let (lon, lat, height) = point.coordinate().unwrap();
        assert_eq!(lon, 4.3671234);
        assert_eq!(lat, 50.8412345);
        assert_eq!(height, 12.5);
    }

    #[test]
    fn malformed_coordinate_is_rejected() {
        let point = Point {
            coordinates: "4.3,not-a-number".to_string(),
        };
        assert!(point.coordinate().is_err());
    }
}
