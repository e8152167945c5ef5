//! Page bodies. Each function returns the `<main>` content; handlers wrap it
//! in [`layout`](super::layout).

use super::{escape, or_placeholder};
use crate::admin::sort::{RegistrationSort, SortColumn, SortDirection};
use crate::client::{AdminDashboardData, Notice, VolunteerDashboardData};
use crate::core::models::{Registration, Task, TeamSummary};
use crate::profiles::ParticipantOverview;

const AGENDA: [(&str, &[(&str, &str)]); 3] = [
    (
        "Day 1",
        &[
            ("09:00", "Check-in and breakfast"),
            ("10:00", "Opening ceremony"),
            ("11:00", "Team formation"),
            ("12:00", "Hacking begins"),
        ],
    ),
    (
        "Day 2",
        &[
            ("09:00", "Breakfast"),
            ("10:00", "Workshops"),
            ("14:00", "Mentor office hours"),
            ("20:00", "Midnight snacks"),
        ],
    ),
    (
        "Day 3",
        &[
            ("09:00", "Breakfast"),
            ("12:00", "Hacking ends"),
            ("13:00", "Project demos"),
            ("16:00", "Awards and closing"),
        ],
    ),
];

const RESOURCES: [(&str, &str); 3] = [
    ("API Documentation", "Access technical resources"),
    ("Workshop Materials", "Download materials"),
    ("Help Desk", "Get support"),
];

const VOLUNTEER_NOTES: [&str; 4] = [
    "Please arrive 15 minutes before your scheduled task time",
    "Wear your volunteer T-shirt during your shifts",
    "Report to the volunteer coordinator at the start of your shift",
    "Contact the volunteer coordinator if you need to make any schedule changes",
];

fn error_slot(error: Option<&str>) -> String {
    error
        .map(|e| format!(r#"<div class="error" role="alert">{}</div>"#, escape(e)))
        .unwrap_or_default()
}

pub fn home() -> String {
    r#"<section class="hero">
<h1>MDC Hackathon</h1>
<p>Three days of building, learning and shipping with people who love to make things.</p>
<a class="cta" href="/register">Register Now</a>
<a href="/schedule">View Schedule</a>
</section>"#
        .to_string()
}

pub fn schedule() -> String {
    let days: String = AGENDA
        .iter()
        .map(|(day, slots)| {
            let items: String = slots
                .iter()
                .map(|(time, what)| format!("<li><time>{}</time> {}</li>", time, what))
                .collect();
            format!(r#"<section class="day"><h2>{}</h2><ul>{}</ul></section>"#, day, items)
        })
        .collect();

    format!("<h1>Event Schedule</h1>\n{}", days)
}

pub fn login_form(error: Option<&str>) -> String {
    format!(
        r#"<h1>Welcome Back</h1>
<p>Or <a href="/register">register for the hackathon</a></p>
{error}
<form method="post" action="/login">
<input id="email" name="email" type="email" required placeholder="Email address">
<input id="password" name="password" type="password" required placeholder="Password">
<button type="submit">Sign in</button>
</form>"#,
        error = error_slot(error),
    )
}

pub fn register_form(error: Option<&str>) -> String {
    format!(
        r#"<h1>Register</h1>
{error}
<form method="post" action="/register">
<input name="name" required placeholder="Full name">
<input name="email" type="email" required placeholder="Email address">
<input name="password" type="password" required placeholder="Password">
<input name="phone" placeholder="Phone">
<select name="role">
<option value="participant">Participant</option>
<option value="volunteer">Volunteer</option>
<option value="both">Both</option>
</select>
<select name="experience">
<option value="beginner">Beginner</option>
<option value="intermediate">Intermediate</option>
<option value="advanced">Advanced</option>
</select>
<input name="skills" placeholder="Skills">
<select name="tshirt">
<option>S</option><option>M</option><option>L</option><option>XL</option>
</select>
<input name="dietary" placeholder="Dietary restrictions">
<input name="availability" placeholder="Availability, comma separated (volunteers)">
<button type="submit">Register</button>
</form>"#,
        error = error_slot(error),
    )
}

fn team_card(overview: &ParticipantOverview) -> String {
    let Some(team) = &overview.team else {
        return "<p>No team assigned yet</p>".to_string();
    };

    let members: String = team
        .members
        .iter()
        .map(|m| {
            format!(
                r#"<div class="member"><p>{}</p><p>{}</p></div>"#,
                escape(&m.name),
                escape(&m.email)
            )
        })
        .collect();

    format!(r#"<h4>{}</h4><div class="members">{}</div>"#, escape(&team.name), members)
}

pub fn participant_dashboard(overview: &ParticipantOverview) -> String {
    let profile = overview.profile.clone().unwrap_or_default();

    let fields = [
        ("Email", or_placeholder(profile.email.as_deref())),
        ("Phone", or_placeholder(profile.phone.as_deref())),
        ("Experience Level", or_placeholder(profile.experience.as_deref())),
        ("Skills", or_placeholder(profile.skills.as_deref())),
        ("T-Shirt Size", or_placeholder(profile.tshirt.as_deref())),
        ("Dietary Restrictions", escape(profile.dietary_label())),
    ];
    let fields: String = fields
        .iter()
        .map(|(label, value)| format!("<dt>{}</dt><dd>{}</dd>", label, value))
        .collect();

    let days: String = AGENDA
        .iter()
        .map(|(day, _)| {
            format!(
                r#"<div class="day"><h4>{}</h4><p>View your personalized schedule</p></div>"#,
                day
            )
        })
        .collect();

    let resources: String = RESOURCES
        .iter()
        .map(|(title, blurb)| format!(r##"<a href="#"><h4>{}</h4><p>{}</p></a>"##, title, blurb))
        .collect();

    format!(
        r#"<section class="banner">
<h2>Welcome back, {name}</h2>
<p>Your next hackathon adventure awaits!</p>
</section>
<section class="card"><h3>Your Profile</h3><dl>{fields}</dl></section>
<section class="card"><h3>Your Team</h3>{team}</section>
<section class="card"><h3>Your Schedule</h3>{days}</section>
<section class="card"><h3>Resources</h3>{resources}</section>"#,
        name = or_placeholder(profile.name.as_deref()),
        fields = fields,
        team = team_card(overview),
        days = days,
        resources = resources,
    )
}

fn task_item(task: &Task) -> String {
    format!(
        r#"<li class="task"><h4>{}</h4><p>{}</p><span class="time">{}</span> <span class="location">{}</span></li>"#,
        escape(&task.name),
        or_placeholder(task.description.as_deref()),
        or_placeholder(task.time.as_deref()),
        or_placeholder(task.location.as_deref()),
    )
}

pub fn volunteer_dashboard(data: &VolunteerDashboardData) -> String {
    let volunteer = data.volunteer.as_ref();
    let availability = volunteer
        .map(|v| v.availability.join(", "))
        .filter(|a| !a.is_empty());

    let tasks: String = data.tasks.iter().map(task_item).collect();
    let notes: String = VOLUNTEER_NOTES
        .iter()
        .map(|note| format!("<li>{}</li>", note))
        .collect();

    format!(
        r#"<section class="card">
<h2>Welcome, {name}</h2>
<h3>Your Information</h3>
<dl>
<dt>Email</dt><dd>{email}</dd>
<dt>Phone</dt><dd>{phone}</dd>
<dt>Availability</dt><dd>{availability}</dd>
</dl>
</section>
<section class="card"><h3>Your Tasks</h3><ul class="tasks">{tasks}</ul></section>
<section class="card"><h3>Important Information</h3><ul>{notes}</ul></section>"#,
        name = or_placeholder(volunteer.and_then(|v| v.name.as_deref())),
        email = or_placeholder(volunteer.and_then(|v| v.email.as_deref())),
        phone = or_placeholder(volunteer.and_then(|v| v.phone.as_deref())),
        availability = or_placeholder(availability.as_deref()),
        tasks = tasks,
        notes = notes,
    )
}

fn sort_header(column: SortColumn, current: Option<RegistrationSort>) -> String {
    let marker = match current {
        Some(s) if s.column == column => match s.direction {
            SortDirection::Asc => " ▲",
            SortDirection::Desc => " ▼",
        },
        _ => "",
    };
    format!(
        r#"<th><a href="/admin/dashboard{}">{}{}</a></th>"#,
        escape(&RegistrationSort::toggle_query(current, column)),
        column.header(),
        marker
    )
}

fn registration_row(r: &Registration) -> String {
    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        escape(&r.id),
        escape(&r.name),
        escape(&r.email),
        r.team.as_deref().map(escape).unwrap_or_else(|| "-".to_string()),
        or_placeholder(r.experience.as_deref()),
        or_placeholder(
            r.created_at
                .map(|at| at.format("%Y-%m-%d").to_string())
                .as_deref()
        ),
    )
}

fn team_overview(team: &TeamSummary) -> String {
    let members: String = team
        .members
        .iter()
        .map(|m| format!("<li>{}</li>", escape(&m.name)))
        .collect();
    format!(
        r#"<div class="team"><h4>{}</h4><p>Members: {}</p><ul>{}</ul></div>"#,
        escape(&team.name),
        team.members.len(),
        members
    )
}

pub fn admin_dashboard(
    data: &AdminDashboardData,
    sort: Option<RegistrationSort>,
    notice: Option<Notice>,
) -> String {
    let notice = notice
        .map(|n| {
            let class = if n.is_error() { "error" } else { "notice" };
            format!(r#"<div class="{}" role="alert">{}</div>"#, class, n.message())
        })
        .unwrap_or_default();

    let mut registrations = data.registrations.clone();
    if let Some(sort) = sort {
        sort.apply(&mut registrations);
    }

    let headers: String = SortColumn::ALL
        .into_iter()
        .map(|column| sort_header(column, sort))
        .collect();
    let rows: String = registrations.iter().map(registration_row).collect();
    let teams: String = data.teams.iter().map(team_overview).collect();

    format!(
        r##"{notice}
<section class="card">
<h3>Welcome Message</h3>
<form method="post" action="/admin/welcome-message">
<textarea name="message" placeholder="Enter welcome message...">{welcome}</textarea>
<button type="submit">Update Message</button>
</form>
</section>
<nav class="tabs"><a href="#registrations">Registrations</a> <a href="#teams">Teams</a></nav>
<section class="card" id="registrations">
<h3>Registrations Dashboard</h3>
<p>Total Registrations: {total_registrations}</p>
<table>
<thead><tr>{headers}</tr></thead>
<tbody>{rows}</tbody>
</table>
</section>
<section class="card" id="teams">
<h3>Teams Overview</h3>
<p>Total Teams: {total_teams}</p>
<div class="teams">{teams}</div>
</section>"##,
        notice = notice,
        welcome = escape(&data.welcome_message),
        total_registrations = registrations.len(),
        headers = headers,
        rows = rows,
        total_teams = data.teams.len(),
        teams = teams,
    )
}

/// Plain message page for 403s and similar dead ends.
pub fn message(title: &str, text: &str) -> String {
    format!("<h1>{}</h1><p>{}</p>", escape(title), escape(text))
}
