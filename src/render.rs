use crate::types::{Reading, Workout, WorkoutId};
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Markup for one list entry.
pub fn render_workout(w: &Workout) -> String {
    let mut html = format!(
        "<li class=\"workout workout--{}\" data-id=\"{}\">\n",
        w.kind(),
        encode_double_quoted_attribute(w.id().as_str())
    );
    html.push_str(&title(w.description()));

    push_row(&mut html, w.icon(), &w.distance().to_string(), "km");
    push_row(&mut html, "⏱", &w.duration().to_string(), "min");

    let Reading { icon, value, unit } = w.details().derived();
    push_row(&mut html, icon, &format!("{value:.1}"), unit);

    let Reading { icon, value, unit } = w.details().metric();
    push_row(&mut html, icon, &value.to_string(), unit);

    html.push_str(
        r#"  <div class="workout__delete__btn">
    <span class="workout__delete">Delete</span>
  </div>
</li>
"#,
    );
    html
}

fn title(text: &str) -> String {
    format!(
        "  <h2 class=\"workout__title\">{}</h2>\n",
        encode_text(text)
    )
}

fn push_row(html: &mut String, icon: &str, value: &str, unit: &str) {
    html.push_str(&format!(
        r#"  <div class="workout__details">
    <span class="workout__icon">{icon}</span>
    <span class="workout__value">{value}</span>
    <span class="workout__unit">{unit}</span>
  </div>
"#
    ));
}

/// The workout list below the form. Entries are only ever inserted or
/// removed one at a time.
#[derive(Debug, Default, Clone)]
pub struct WorkoutList {
    // Document order: index 0 sits right after the form.
    entries: Vec<(WorkoutId, String)>,
}

impl WorkoutList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places the entry immediately after the form, ahead of older ones.
    pub fn insert_after_form(&mut self, w: &Workout) {
        self.entries.insert(0, (w.id().clone(), render_workout(w)));
    }

    pub fn remove(&mut self, id: &WorkoutId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(e, _)| e != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids in document order.
    pub fn ids(&self) -> impl Iterator<Item = &WorkoutId> {
        self.entries.iter().map(|(id, _)| id)
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<ul class=\"workouts\">\n");
        for (_, fragment) in &self.entries {
            out.push_str(fragment);
        }
        out.push_str("</ul>\n");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Activity, Coords};
    use chrono::{TimeZone, Utc};

    fn make(ms: i64, activity: Activity, distance: f64, duration: f64) -> Workout {
        let t = Utc.timestamp_millis_opt(ms).single().unwrap();
        Workout::create(activity, Coords::new(39.0, -12.0), distance, duration, t).unwrap()
    }

    #[test]
    fn running_entry_shows_pace_and_cadence() {
        let w = make(
            1_713_100_000_000,
            Activity::Running { cadence: 178.0 },
            5.2,
            24.0,
        );
        let html = render_workout(&w);

        assert!(html.starts_with(&format!(
            r#"<li class="workout workout--running" data-id="{}">"#,
            w.id()
        )));
        assert!(html.contains(w.description()));
        assert!(html.contains(r#"<span class="workout__value">5.2</span>"#));
        assert!(html.contains(r#"<span class="workout__value">24</span>"#));
        assert!(html.contains(r#"<span class="workout__value">4.6</span>"#));
        assert!(html.contains("min/km"));
        assert!(html.contains(r#"<span class="workout__value">178</span>"#));
        assert!(html.contains("spm"));
        assert!(html.contains(r#"<span class="workout__delete">Delete</span>"#));
        assert!(html.trim_end().ends_with("</li>"));
    }

    #[test]
    fn cycling_and_swimming_units() {
        let c = render_workout(&make(
            1_713_100_000_000,
            Activity::Cycling {
                elevation_gain: 523.0,
            },
            27.0,
            90.0,
        ));
        assert!(c.contains("🚴"));
        assert!(c.contains(r#"<span class="workout__value">18.0</span>"#));
        assert!(c.contains("km/h"));
        assert!(c.contains(r#"<span class="workout__unit">m</span>"#));

        let s = render_workout(&make(
            1_713_100_000_000,
            Activity::Swimming { laps: 40.0 },
            2.0,
            50.0,
        ));
        assert!(s.contains("🏊"));
        assert!(s.contains("km/min"));
        assert!(s.contains(r#"<span class="workout__unit">lap</span>"#));
    }

    #[test]
    fn newest_entry_goes_first() {
        let a = make(1_713_100_000_001, Activity::Running { cadence: 1.0 }, 1.0, 1.0);
        let b = make(1_713_100_000_002, Activity::Running { cadence: 1.0 }, 1.0, 1.0);

        let mut list = WorkoutList::new();
        list.insert_after_form(&a);
        list.insert_after_form(&b);
        assert_eq!(list.ids().collect::<Vec<_>>(), vec![b.id(), a.id()]);

        let html = list.to_html();
        let pos_a = html.find(&format!(r#"data-id="{}""#, a.id())).unwrap();
        let pos_b = html.find(&format!(r#"data-id="{}""#, b.id())).unwrap();
        assert!(pos_b < pos_a);

        assert!(list.remove(a.id()));
        assert!(!list.remove(a.id()));
        assert_eq!(list.len(), 1);
        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn title_escapes_markup() {
        assert_eq!(
            title("Run <fast> & far"),
            "  <h2 class=\"workout__title\">Run &lt;fast&gt; &amp; far</h2>\n"
        );
    }

    #[test]
    fn data_id_is_attribute_escaped() {
        let w = make(1_713_100_000_000, Activity::Running { cadence: 170.0 }, 5.0, 25.0);
        let mut record = serde_json::to_value(&w).unwrap();
        record["id"] = serde_json::json!("12\"34");
        let odd: Workout = serde_json::from_value(record).unwrap();

        let html = render_workout(&odd);
        assert!(html.starts_with(r#"<li class="workout workout--running" data-id="12&quot;34">"#));
    }
}
