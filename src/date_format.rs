//! Conversión entre la fecha de calendario ISO (`YYYY-MM-DD`) y el formato
//! textual `DD-MON-YYYY` que exige la capa de almacenamiento.
//!
//! Las fechas son días de calendario sin zona horaria; aquí no se valida el
//! rango del día del mes, solo la abreviatura del mes tiene que existir.

/// Abreviaturas de mes de la capa de almacenamiento, indexadas por mes 1-12.
const MESES: [&str; 12] = [
    "ENE", "FEB", "MAR", "ABR", "MAY", "JUN", "JUL", "AGO", "SEP", "OCT", "NOV", "DIC",
];

/// Convierte una fecha ISO `YYYY-MM-DD` al formato de almacenamiento
/// `DD-MON-YYYY` (por ejemplo `2023-12-15` -> `15-DIC-2023`).
///
/// Devuelve `None` con entrada vacía, incompleta o con un mes fuera de 1-12.
pub fn a_formato_almacen(fecha_iso: &str) -> Option<String> {
    if fecha_iso.is_empty() {
        return None;
    }
    let mut partes = fecha_iso.splitn(3, '-');
    let anio = partes.next()?;
    let mes = partes.next()?;
    let dia = partes.next()?;
    let indice = mes.parse::<usize>().ok()?;
    if !(1..=12).contains(&indice) {
        return None;
    }
    Some(format!("{dia}-{}-{anio}", MESES[indice - 1]))
}

/// Conversión inversa, de `DD-MON-YYYY` a `YYYY-MM-DD`, usada al hidratar un
/// registro almacenado de vuelta hacia el formulario de edición.
///
/// La abreviatura de mes se busca sin distinguir mayúsculas; una abreviatura
/// desconocida devuelve `None`.
pub fn a_formato_iso(fecha_almacen: &str) -> Option<String> {
    if fecha_almacen.is_empty() {
        return None;
    }
    let mut partes = fecha_almacen.splitn(3, '-');
    let dia = partes.next()?;
    let mes = partes.next()?;
    let anio = partes.next()?;
    let indice = MESES
        .iter()
        .position(|abreviatura| abreviatura.eq_ignore_ascii_case(mes))?
        + 1;
    Some(format!("{anio}-{indice:02}-{dia:0>2}"))
}
