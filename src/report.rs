use crate::jira::Issue;

/// Issues sharing one sprint label
#[derive(Debug)]
pub struct SprintGroup<'a> {
    pub label: &'a str,
    pub issues: Vec<&'a Issue>,
    pub points: f64,
}

impl SprintGroup<'_> {
    pub fn count(&self) -> usize {
        self.issues.len()
    }
}

/// Group issues by their sprint label.
///
/// Groups appear in the order their label is first seen; issues keep their
/// input order inside a group.
pub fn group_by_sprint(issues: &[Issue]) -> Vec<SprintGroup<'_>> {
    let mut groups: Vec<SprintGroup<'_>> = Vec::new();

    for issue in issues {
        let label = issue.sprint_label();
        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => {
                group.points += issue.fields.points;
                group.issues.push(issue);
            }
            None => groups.push(SprintGroup {
                label,
                issues: vec![issue],
                points: issue.fields.points,
            }),
        }
    }

    groups
}

/// Render story points: `-` for zero, otherwise rounded half-up to an integer
pub fn format_points(points: f64) -> String {
    if points == 0.0 {
        return "-".to_string();
    }
    format!("{}", (points + 0.5).floor() as i64)
}

/// Plain-text report, one block per sprint group
pub fn render_report(groups: &[SprintGroup<'_>]) -> String {
    let mut lines = Vec::new();

    for group in groups {
        lines.push(format!(
            "Sprint: {} ({} issues, {} pts)",
            group.label,
            group.count(),
            format_points(group.points)
        ));

        for issue in &group.issues {
            let f = &issue.fields;
            lines.push(format!(
                "{}\t{}\t{}\t{}\t{}",
                issue.key,
                format_points(f.points),
                f.status,
                f.issue_type,
                f.summary
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// One-line description used in pick lists
pub fn issue_label(issue: &Issue) -> String {
    let f = &issue.fields;
    if f.status.is_empty() {
        format!("{}  {}", issue.key, f.summary)
    } else {
        format!("{}  {}  [{}]", issue.key, f.summary, f.status)
    }
}
