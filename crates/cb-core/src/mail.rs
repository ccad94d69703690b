//! Notification mails sent to a listing's poster.

use std::path::PathBuf;

use crate::models::{Application, Event, Job, Participation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailAttachment {
    pub file_name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment: Option<MailAttachment>,
}

/// Tells a job's poster about a new applicant. `None` when the job has no
/// poster address.
pub fn application_mail(
    job: &Job,
    application: &Application,
    attachment: Option<MailAttachment>,
) -> Option<OutgoingMail> {
    let to = poster(job.poster_email.as_deref())?;
    Some(OutgoingMail {
        to,
        subject: format!("Job Application for {}", job.title),
        body: format!(
            "Applicant: {}\nContact: {}\n\nMessage:\n{}",
            application.applicant_email, application.contact_number, application.message
        ),
        attachment,
    })
}

/// Tells an event's poster about a new registration.
pub fn participation_mail(event: &Event, participation: &Participation) -> Option<OutgoingMail> {
    let to = poster(event.poster_email.as_deref())?;

    let mut body = format!(
        "Participant: {}\nEmail: {}\nContact: {}\n\nEvent: {}\nDate: {} at {}\n\n",
        participation.participant_name,
        participation.participant_email,
        participation.participant_contact,
        event.title,
        event.date,
        event.time,
    );
    let optional = [
        ("Payment Ref", &participation.payment_ref),
        ("Phone", &participation.phone),
        ("Company", &participation.company),
        ("Role", &participation.role),
        ("Industry", &participation.industry),
        ("Experience", &participation.experience),
        ("Event Goals", &participation.goals),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            body.push_str(&format!("{label}: {value}\n"));
        }
    }
    if !participation.additional_info.is_empty() {
        body.push_str(&format!("\nAdditional Info:\n{}\n", participation.additional_info));
    }

    Some(OutgoingMail {
        to,
        subject: format!("New Event Registration: {}", event.title),
        body,
        attachment: None,
    })
}

fn poster(address: Option<&str>) -> Option<String> {
    address
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_owned)
}
