//! The two form variants inspectors submit

use once_cell::sync::Lazy;

use super::{
    DurationUnits, FieldKind, FieldSpec, HeaderMatch, MetadataKind, Schema, SchemaConfig,
    TotalRule, DEFAULT_METADATA_SCAN_ROWS,
};

static DAILY_INSPECTION: Lazy<Schema> = Lazy::new(|| {
    Schema::compile(daily_inspection_config()).expect("built-in inspection schema is valid")
});

static OUT_OF_SECTION_TICKET: Lazy<Schema> = Lazy::new(|| {
    Schema::compile(out_of_section_ticket_config()).expect("built-in ticket schema is valid")
});

impl Schema {
    /// Daily inspection form: any three known columns identify the header.
    pub fn daily_inspection() -> &'static Schema {
        &DAILY_INSPECTION
    }

    /// Out-of-section ticket form: five of its eight core columns identify
    /// the header.
    pub fn out_of_section_ticket() -> &'static Schema {
        &OUT_OF_SECTION_TICKET
    }

    /// Look up a built-in schema by name
    pub fn builtin(name: &str) -> Option<&'static Schema> {
        match name.trim().to_lowercase().as_str() {
            "inspection" | "daily-inspection" | "daily_inspection" => {
                Some(Self::daily_inspection())
            }
            "ticket" | "out-of-section-ticket" | "out_of_section_ticket" => {
                Some(Self::out_of_section_ticket())
            }
            _ => None,
        }
    }

    /// Names accepted by [`Schema::builtin`]
    pub fn builtin_names() -> &'static [&'static str] {
        &["daily-inspection", "out-of-section-ticket"]
    }
}

fn daily_inspection_config() -> SchemaConfig {
    use FieldKind::*;

    SchemaConfig {
        name: "daily-inspection".into(),
        metadata_fields: vec![
            FieldSpec::new(
                "place",
                MetadataKind::Text,
                &["lugar", "lugar de inspección", "lugar de inspeccion", "punto de control"],
            ),
            FieldSpec::new("line", MetadataKind::Text, &["línea", "linea", "línea/ruta"]),
            FieldSpec::new(
                "inspector",
                MetadataKind::Text,
                &[
                    "inspector",
                    "inspectora",
                    "nombre inspector",
                    "nombre del inspector",
                    "fiscalizador",
                ],
            ),
            FieldSpec::new(
                "date",
                MetadataKind::Date,
                &["fecha", "fecha de inspección", "fecha de inspeccion", "fecha inspección"],
            ),
            FieldSpec::new("shift", MetadataKind::Text, &["turno", "jornada"]),
            FieldSpec::new(
                "totalPassengers",
                MetadataKind::Integer,
                &["total pasajeros", "total de pasajeros"],
            ),
        ],
        data_fields: vec![
            FieldSpec::new(
                "serviceCode",
                Text,
                &[
                    "serv",
                    "serv.",
                    "servicio",
                    "código servicio",
                    "codigo servicio",
                    "código de servicio",
                    "codigo de servicio",
                    "n° servicio",
                ],
            ),
            FieldSpec::new(
                "routeNumber",
                Text,
                &["ruta", "n° ruta", "número de ruta", "numero de ruta", "recorrido"],
            ),
            FieldSpec::new(
                "driverName",
                Text,
                &["conductor", "nombre conductor", "nombre del conductor", "chofer"],
            ),
            FieldSpec::new(
                "busNumber",
                Text,
                &["bus", "n° bus", "máquina", "maquina", "patente", "ppu"],
            ),
            FieldSpec::new(
                "scheduledTime",
                Time,
                &["hora", "hora programada", "horario", "hora salida", "hora de salida"],
            ),
            FieldSpec::new(
                "arrivalTime",
                Time,
                &["hora llegada", "hora de llegada", "llegada", "hora real"],
            ),
            FieldSpec::new(
                "gpsVariance",
                Duration,
                &[
                    "gps",
                    "desfase",
                    "desfase gps",
                    "variación gps",
                    "variacion gps",
                    "adelanto/atraso",
                ],
            ),
            FieldSpec::new(
                "passengers",
                Count,
                &["pasajeros", "pax", "n° pasajeros", "cantidad pasajeros"],
            ),
            FieldSpec::new("tickets", Count, &["boletos", "tickets", "boletos cortados"]),
            FieldSpec::new("passes", Count, &["pases", "pase escolar", "pases escolares"]),
            FieldSpec::new(
                "observations",
                Text,
                &["observaciones", "observación", "observacion", "obs", "obs.", "comentarios"],
            ),
            FieldSpec::new(
                "nonComplianceReported",
                Flag,
                &["incumplimiento", "no conformidad", "infracción", "infraccion"],
            ),
        ],
        header_match: HeaderMatch {
            threshold: 3,
            critical: None,
        },
        identifying_fields: vec![
            "routeNumber".into(),
            "driverName".into(),
            "serviceCode".into(),
        ],
        duration_units: DurationUnits::Seconds,
        duration_field: Some("gpsVariance".into()),
        observation_fields: vec!["observations".into()],
        explicit_non_compliance_field: Some("nonComplianceReported".into()),
        totals: vec![TotalRule {
            metadata_key: "totalPassengers".into(),
            data_key: "passengers".into(),
        }],
        metadata_scan_rows: DEFAULT_METADATA_SCAN_ROWS,
    }
}

fn out_of_section_ticket_config() -> SchemaConfig {
    use FieldKind::*;

    SchemaConfig {
        name: "out-of-section-ticket".into(),
        metadata_fields: vec![
            FieldSpec::new(
                "inspector",
                MetadataKind::Text,
                &["inspector", "inspectora", "nombre inspector", "nombre del inspector"],
            ),
            FieldSpec::new("date", MetadataKind::Date, &["fecha", "fecha control"]),
            FieldSpec::new("place", MetadataKind::Text, &["lugar", "punto de control"]),
            FieldSpec::new("line", MetadataKind::Text, &["línea", "linea"]),
            FieldSpec::new(
                "busNumber",
                MetadataKind::Text,
                &["bus", "n° bus", "máquina", "maquina"],
            ),
            FieldSpec::new(
                "totalTickets",
                MetadataKind::Integer,
                &["total boletos", "total de boletos"],
            ),
            FieldSpec::new(
                "totalPassengers",
                MetadataKind::Integer,
                &["total pasajeros", "total de pasajeros"],
            ),
        ],
        data_fields: vec![
            FieldSpec::new(
                "serviceCode",
                Text,
                &["serv", "serv.", "servicio", "código servicio", "codigo servicio", "n° servicio"],
            ),
            FieldSpec::new("stop", Text, &["paradero", "parada", "n° paradero"]),
            FieldSpec::new("passTime", Time, &["hora", "hora paso", "hora de paso"]),
            FieldSpec::new(
                "gpsVariance",
                Duration,
                &["gps", "desfase", "desfase gps", "adelanto/atraso"],
            ),
            FieldSpec::new("passengers", Count, &["pasajeros", "pax"]),
            FieldSpec::new(
                "tickets",
                Count,
                &["boletos", "tickets", "boletos fuera de sección", "boletos fuera de seccion"],
            ),
            FieldSpec::new("passes", Count, &["pases", "pase escolar"]),
            FieldSpec::new(
                "observations",
                Text,
                &["observaciones", "observación", "observacion", "obs", "obs."],
            ),
            FieldSpec::new("direction", Text, &["sentido", "dirección", "direccion"]),
            FieldSpec::new(
                "nonComplianceReported",
                Flag,
                &["incumplimiento", "no cumple"],
            ),
        ],
        header_match: HeaderMatch {
            threshold: 5,
            critical: Some(
                [
                    "serviceCode",
                    "stop",
                    "passTime",
                    "gpsVariance",
                    "passengers",
                    "tickets",
                    "passes",
                    "observations",
                ]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            ),
        },
        identifying_fields: vec!["serviceCode".into()],
        duration_units: DurationUnits::ClockSerial,
        duration_field: Some("gpsVariance".into()),
        observation_fields: vec!["observations".into()],
        explicit_non_compliance_field: Some("nonComplianceReported".into()),
        totals: vec![
            TotalRule {
                metadata_key: "totalTickets".into(),
                data_key: "tickets".into(),
            },
            TotalRule {
                metadata_key: "totalPassengers".into(),
                data_key: "passengers".into(),
            },
        ],
        metadata_scan_rows: DEFAULT_METADATA_SCAN_ROWS,
    }
}
