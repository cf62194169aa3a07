//! Resumen estadístico derivado de la lista filtrada de registros.
//!
//! El resumen se recalcula en cada petición y nunca se persiste.

use serde::Serialize;

use crate::model::Registro;

/// Conteo de una enumeración sobre la lista filtrada. El porcentaje va
/// redondeado a un decimal, igual que en las vistas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conteo {
    pub valor: String,
    pub cantidad: usize,
    pub porcentaje: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResumenEstadistico {
    pub total: usize,
    pub por_estado: Vec<Conteo>,
    pub por_tipo: Vec<Conteo>,
}

/// Agrupa la lista filtrada por estado y por tipo. Los valores declarados del
/// módulo salen siempre, en el orden del formulario y con cantidad cero si no
/// aparecen; un valor no declarado que llegue en los datos se agrega al final
/// en orden de aparición, de modo que los conteos siempre suman el total.
pub fn resumir<R: Registro>(registros: &[&R]) -> ResumenEstadistico {
    ResumenEstadistico {
        total: registros.len(),
        por_estado: contar(registros, R::ESTADOS, |registro| registro.estado()),
        por_tipo: contar(registros, R::TIPOS, |registro| registro.tipo()),
    }
}

fn contar<'a, R>(
    registros: &[&'a R],
    declarados: &'static [&'static str],
    clave: impl Fn(&'a R) -> &'a str,
) -> Vec<Conteo> {
    let total = registros.len();
    let mut conteos: Vec<(&str, usize)> =
        declarados.iter().map(|valor| (*valor, 0)).collect();
    for registro in registros.iter().copied() {
        let valor = clave(registro);
        match conteos.iter().position(|(visto, _)| *visto == valor) {
            Some(indice) => conteos[indice].1 += 1,
            None => conteos.push((valor, 1)),
        }
    }
    conteos
        .into_iter()
        .map(|(valor, cantidad)| Conteo {
            valor: valor.to_string(),
            cantidad,
            porcentaje: porcentaje(cantidad, total),
        })
        .collect()
}

fn porcentaje(cantidad: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (cantidad as f64 * 1000.0 / total as f64).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InspeccionModel;

    fn inspeccion(id: i32, estado: &str) -> InspeccionModel {
        InspeccionModel {
            id,
            vehiculo_id: 1,
            fecha_inspeccion: "15-DIC-2023".to_string(),
            tipo_inspeccion: "Periódica".to_string(),
            estado: estado.to_string(),
        }
    }

    fn con_estados(estados: &[&str]) -> Vec<InspeccionModel> {
        estados
            .iter()
            .enumerate()
            .map(|(indice, estado)| inspeccion(indice as i32 + 1, estado))
            .collect()
    }

    #[test]
    fn escenario_de_diez_inspecciones() {
        let registros = con_estados(&[
            "Aprobado", "Aprobado", "Aprobado", "Aprobado", "Aprobado", "Aprobado", "Rechazado",
            "Rechazado", "Rechazado", "Pendiente",
        ]);
        let referencias: Vec<&InspeccionModel> = registros.iter().collect();
        let resumen = resumir(&referencias);

        assert_eq!(resumen.total, 10);
        let buscar = |valor: &str| {
            resumen
                .por_estado
                .iter()
                .find(|conteo| conteo.valor == valor)
                .unwrap()
                .clone()
        };
        assert_eq!(buscar("Aprobado").cantidad, 6);
        assert_eq!(buscar("Aprobado").porcentaje, 60.0);
        assert_eq!(buscar("Rechazado").cantidad, 3);
        assert_eq!(buscar("Rechazado").porcentaje, 30.0);
        assert_eq!(buscar("Pendiente").cantidad, 1);
        assert_eq!(buscar("Pendiente").porcentaje, 10.0);
    }

    #[test]
    fn lista_vacia_reporta_cero_por_ciento() {
        let referencias: Vec<&InspeccionModel> = Vec::new();
        let resumen = resumir(&referencias);
        assert_eq!(resumen.total, 0);
        for conteo in resumen.por_estado.iter().chain(resumen.por_tipo.iter()) {
            assert_eq!(conteo.cantidad, 0);
            assert_eq!(conteo.porcentaje, 0.0);
        }
    }

    #[test]
    fn los_conteos_suman_el_total() {
        let registros = con_estados(&["Aprobado", "Rechazado", "Pendiente", "En Proceso"]);
        let referencias: Vec<&InspeccionModel> = registros.iter().collect();
        let resumen = resumir(&referencias);
        let suma: usize = resumen.por_estado.iter().map(|conteo| conteo.cantidad).sum();
        assert_eq!(suma, resumen.total);
    }

    #[test]
    fn un_valor_no_declarado_se_agrega_al_final() {
        let registros = con_estados(&["Aprobado", "Observado"]);
        let referencias: Vec<&InspeccionModel> = registros.iter().collect();
        let resumen = resumir(&referencias);

        let ultimo = resumen.por_estado.last().unwrap();
        assert_eq!(ultimo.valor, "Observado");
        assert_eq!(ultimo.cantidad, 1);
        let suma: usize = resumen.por_estado.iter().map(|conteo| conteo.cantidad).sum();
        assert_eq!(suma, resumen.total);
    }

    #[test]
    fn los_valores_declarados_mantienen_el_orden_del_formulario() {
        let registros = con_estados(&["Rechazado"]);
        let referencias: Vec<&InspeccionModel> = registros.iter().collect();
        let resumen = resumir(&referencias);
        let orden: Vec<&str> = resumen
            .por_estado
            .iter()
            .map(|conteo| conteo.valor.as_str())
            .collect();
        assert_eq!(orden, ["Pendiente", "Aprobado", "Rechazado", "En Proceso"]);
    }

    #[test]
    fn el_porcentaje_se_redondea_a_un_decimal() {
        let registros = con_estados(&["Aprobado", "Rechazado", "Pendiente"]);
        let referencias: Vec<&InspeccionModel> = registros.iter().collect();
        let resumen = resumir(&referencias);
        let aprobado = resumen
            .por_estado
            .iter()
            .find(|conteo| conteo.valor == "Aprobado")
            .unwrap();
        assert_eq!(aprobado.porcentaje, 33.3);
    }
}
