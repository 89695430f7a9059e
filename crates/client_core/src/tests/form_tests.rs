use super::*;

use shared::{dates::ServiceDate, domain::StudentId, error::DateFormatError};

#[test]
fn encodes_a_complete_form() {
    let draft = StudentForm::new("Ana", "12", "09/05/2012")
        .to_draft()
        .expect("valid form");
    assert_eq!(
        draft,
        StudentDraft {
            name: "Ana".into(),
            age: 12,
            birth_date: "2012-05-09".into(),
        }
    );
}

#[test]
fn reports_the_first_missing_field() {
    let cases = [
        (StudentForm::new("", "12", "09/05/2012"), "name"),
        (StudentForm::new("  ", "12", "09/05/2012"), "name"),
        (StudentForm::new("Ana", "", "09/05/2012"), "age"),
        (StudentForm::new("Ana", "12", ""), "birth date"),
    ];

    for (form, missing) in cases {
        match form.to_draft() {
            Err(RosterError::Validation { field, .. }) => assert_eq!(field, missing),
            other => panic!("expected validation failure for {missing}, got {other:?}"),
        }
    }
}

#[test]
fn rejects_ages_that_are_not_whole_numbers() {
    for age in ["twelve", "-1", "12.5"] {
        let err = StudentForm::new("Ana", age, "09/05/2012")
            .to_draft()
            .expect_err("age must be numeric");
        assert!(matches!(err, RosterError::Validation { field: "age", .. }));
    }
}

#[test]
fn rejects_birth_dates_not_in_display_form() {
    let err = StudentForm::new("Ana", "12", "2012-05-09")
        .to_draft()
        .expect_err("wrong date shape");
    assert!(matches!(
        err,
        RosterError::MalformedDate(DateFormatError::NotDayMonthYear { .. })
    ));
    assert!(err.is_local());
}

#[test]
fn populates_from_a_cached_student() {
    let student = Student {
        id: StudentId(3),
        name: "Bruno".into(),
        age: 9,
        birth_date: ServiceDate::from_parts(2015, 1, 7),
    };

    let form = StudentForm::from_student(&student);
    assert_eq!(form, StudentForm::new("Bruno", "9", "7/01/2015"));

    let draft = form.to_draft().expect("round trip through the form");
    assert_eq!(draft.birth_date, "2015-01-07");
}

#[test]
fn clear_empties_every_field() {
    let mut form = StudentForm::new("Ana", "12", "09/05/2012");
    assert!(!form.is_empty());
    form.clear();
    assert!(form.is_empty());
}
