//! Filtrado en memoria de la lista de registros por una consulta libre.

use serde::Deserialize;

use crate::model::Registro;

/// Parámetro de búsqueda aceptado por los endpoints de estadísticas y
/// exportación (`?buscar=...`).
#[derive(Debug, Deserialize)]
pub struct Busqueda {
    pub buscar: Option<String>,
}

impl Busqueda {
    pub fn consulta(&self) -> &str {
        self.buscar.as_deref().unwrap_or("")
    }
}

/// Devuelve los registros cuya clasificación coincide con la consulta: basta
/// con que sea subcadena del tipo, del estado (ambos sin distinguir
/// mayúsculas) o de la forma decimal del vehículo referenciado. Una consulta
/// vacía devuelve la lista completa.
pub fn filtrar<'a, R: Registro>(registros: &'a [R], consulta: &str) -> Vec<&'a R> {
    if consulta.is_empty() {
        return registros.iter().collect();
    }
    let consulta_minusculas = consulta.to_lowercase();
    registros
        .iter()
        .filter(|registro| {
            registro
                .tipo()
                .to_lowercase()
                .contains(&consulta_minusculas)
                || registro
                    .estado()
                    .to_lowercase()
                    .contains(&consulta_minusculas)
                || registro.vehiculo_id().to_string().contains(consulta)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InspeccionModel;

    fn inspeccion(id: i32, vehiculo_id: i32, tipo: &str, estado: &str) -> InspeccionModel {
        InspeccionModel {
            id,
            vehiculo_id,
            fecha_inspeccion: "15-DIC-2023".to_string(),
            tipo_inspeccion: tipo.to_string(),
            estado: estado.to_string(),
        }
    }

    fn lista() -> Vec<InspeccionModel> {
        vec![
            inspeccion(1, 10, "Periódica", "Aprobado"),
            inspeccion(2, 22, "Inicial", "Rechazado"),
            inspeccion(3, 102, "Extraordinaria", "Pendiente"),
        ]
    }

    #[test]
    fn consulta_vacia_devuelve_la_lista_completa() {
        let registros = lista();
        let filtrados = filtrar(&registros, "");
        assert_eq!(filtrados.len(), registros.len());
    }

    #[test]
    fn coincide_por_tipo_sin_distinguir_mayusculas() {
        let registros = lista();
        let filtrados = filtrar(&registros, "periód");
        assert_eq!(filtrados.len(), 1);
        assert_eq!(filtrados[0].id, 1);
    }

    #[test]
    fn coincide_por_estado() {
        let registros = lista();
        let filtrados = filtrar(&registros, "rechazado");
        assert_eq!(filtrados.len(), 1);
        assert_eq!(filtrados[0].id, 2);
    }

    #[test]
    fn coincide_por_subcadena_del_vehiculo() {
        let registros = lista();
        // "10" es subcadena tanto de 10 como de 102.
        let filtrados = filtrar(&registros, "10");
        assert_eq!(filtrados.len(), 2);
    }

    #[test]
    fn el_resultado_es_subconjunto_y_cada_registro_cumple_la_regla() {
        let registros = lista();
        let consulta = "en";
        let filtrados = filtrar(&registros, consulta);
        assert!(filtrados.len() <= registros.len());
        for registro in filtrados {
            let coincide = registro.tipo_inspeccion.to_lowercase().contains(consulta)
                || registro.estado.to_lowercase().contains(consulta)
                || registro.vehiculo_id.to_string().contains(consulta);
            assert!(coincide);
        }
    }

    #[test]
    fn sin_coincidencias_devuelve_vacio() {
        let registros = lista();
        assert!(filtrar(&registros, "zzz").is_empty());
    }
}
