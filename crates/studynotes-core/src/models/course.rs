use serde::{Deserialize, Serialize};

/// Document type tag the backend uses for courses
const COURSE_TYPE: &str = "course";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Course {
    #[serde(rename = "_id")]
    pub id: String,
    /// Course code, e.g. "CS101"
    pub course: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub credits: f64,
    #[serde(default)]
    pub user: Option<String>,
}

impl Course {
    /// "Title (CODE)" for list displays
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.title, self.course)
    }

    /// Credits without a trailing ".0" for whole numbers
    pub fn display_credits(&self) -> String {
        if self.credits.fract() == 0.0 {
            format!("{}", self.credits as i64)
        } else {
            format!("{}", self.credits)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewCourse {
    #[serde(rename = "type")]
    pub kind: String,
    pub course: String,
    pub title: String,
    pub description: String,
    pub credits: f64,
}

impl NewCourse {
    pub fn new(
        course: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        credits: f64,
    ) -> Self {
        Self {
            kind: COURSE_TYPE.to_string(),
            course: course.into(),
            title: title.into(),
            description: description.into(),
            credits,
        }
    }
}
