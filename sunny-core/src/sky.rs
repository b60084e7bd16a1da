//! Sky condition codes reported by the weather endpoints.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sky {
    ClearDay,
    ClearNight,
    PartlyCloudyDay,
    PartlyCloudyNight,
    Cloudy,
    Wind,
    LightRain,
    ModerateRain,
    HeavyRain,
    Storm,
    ThunderShower,
    Sleet,
    LightSnow,
    ModerateSnow,
    HeavySnow,
    Snowstorm,
    Hail,
    LightHaze,
    ModerateHaze,
    HeavyHaze,
    Fog,
    Dust,
}

impl Sky {
    /// Looks up a sky code. Unknown codes are shown as a clear day.
    pub fn from_code(code: &str) -> Self {
        match code {
            "CLEAR_DAY" => Sky::ClearDay,
            "CLEAR_NIGHT" => Sky::ClearNight,
            "PARTLY_CLOUDY_DAY" => Sky::PartlyCloudyDay,
            "PARTLY_CLOUDY_NIGHT" => Sky::PartlyCloudyNight,
            "CLOUDY" => Sky::Cloudy,
            "WIND" => Sky::Wind,
            "LIGHT_RAIN" => Sky::LightRain,
            "MODERATE_RAIN" => Sky::ModerateRain,
            "HEAVY_RAIN" => Sky::HeavyRain,
            "STORM" => Sky::Storm,
            "THUNDER_SHOWER" => Sky::ThunderShower,
            "SLEET" => Sky::Sleet,
            "LIGHT_SNOW" => Sky::LightSnow,
            "MODERATE_SNOW" => Sky::ModerateSnow,
            "HEAVY_SNOW" => Sky::HeavySnow,
            "SNOWSTORM" => Sky::Snowstorm,
            "HAIL" => Sky::Hail,
            "LIGHT_HAZE" => Sky::LightHaze,
            "MODERATE_HAZE" => Sky::ModerateHaze,
            "HEAVY_HAZE" => Sky::HeavyHaze,
            "FOG" => Sky::Fog,
            "DUST" => Sky::Dust,
            _ => Sky::ClearDay,
        }
    }

    pub fn info(&self) -> &'static str {
        match self {
            Sky::ClearDay | Sky::ClearNight => "晴",
            Sky::PartlyCloudyDay | Sky::PartlyCloudyNight => "多云",
            Sky::Cloudy => "阴",
            Sky::Wind => "大风",
            Sky::LightRain => "小雨",
            Sky::ModerateRain => "中雨",
            Sky::HeavyRain => "大雨",
            Sky::Storm => "暴雨",
            Sky::ThunderShower => "雷阵雨",
            Sky::Sleet => "雨夹雪",
            Sky::LightSnow => "小雪",
            Sky::ModerateSnow => "中雪",
            Sky::HeavySnow => "大雪",
            Sky::Snowstorm => "暴雪",
            Sky::Hail => "冰雹",
            Sky::LightHaze => "轻度雾霾",
            Sky::ModerateHaze => "中度雾霾",
            Sky::HeavyHaze => "重度雾霾",
            Sky::Fog => "雾",
            Sky::Dust => "浮尘",
        }
    }
}

impl fmt::Display for Sky {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_map_to_descriptions() {
        assert_eq!(Sky::from_code("THUNDER_SHOWER").info(), "雷阵雨");
        assert_eq!(Sky::from_code("HEAVY_HAZE").to_string(), "重度雾霾");
    }

    #[test]
    fn unknown_code_falls_back_to_clear_day() {
        assert_eq!(Sky::from_code("VOLCANIC_ASH"), Sky::ClearDay);
    }
}
