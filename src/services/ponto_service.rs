// src/services/ponto_service.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{PontoRepository, UserRepository},
    models::ponto::{
        AjustarPontoPayload, LancarPontoPayload, PontoListResponse, PontoRegistro, RegistrarPontoPayload,
        ResumoDia, ResumoPonto, TipoPonto, Turno,
    },
};

/// Maior período aceito numa consulta de ponto.
const MAX_PERIODO_DIAS: i64 = 366;

/// Batidas dentro deste intervalo são tratadas como clique duplo.
const JANELA_DUPLICIDADE_SEGUNDOS: i64 = 60;

/// Uma ENTRADA mais antiga que isso não mantém o turno aberto.
const JORNADA_MAXIMA_HORAS: i64 = 16;

// =============================================================================
//  APURAÇÃO (funções puras)
// =============================================================================

/// Resultado do pareamento de um conjunto de batidas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apuracao {
    pub turnos: Vec<Turno>,
    pub total_segundos: i64,
    pub incompleto: bool,
}

/// Pareia cada ENTRADA com a SAIDA seguinte, em ordem cronológica.
///
/// Batidas sem par viram turnos incompletos e marcam a apuração:
/// ENTRADA seguida de outra ENTRADA, SAIDA sem ENTRADA aberta e a ENTRADA
/// que sobra no fim. O total soma só os turnos completos, cada um com
/// duração mínima de zero.
pub fn apurar_turnos(batidas: &[(TipoPonto, DateTime<Utc>)]) -> Apuracao {
    let mut ordenadas = batidas.to_vec();
    // sort estável: empates mantêm a ordem de gravação
    ordenadas.sort_by_key(|(_, em)| *em);

    let mut turnos = Vec::new();
    let mut aberta: Option<DateTime<Utc>> = None;

    for (tipo, em) in ordenadas {
        match (tipo, aberta) {
            (TipoPonto::Entrada, None) => aberta = Some(em),
            (TipoPonto::Entrada, Some(anterior)) => {
                turnos.push(turno_incompleto(Some(anterior), None));
                aberta = Some(em);
            }
            (TipoPonto::Saida, Some(entrada)) => {
                let duracao = (em - entrada).num_seconds().max(0);
                turnos.push(Turno {
                    entrada: Some(entrada),
                    saida: Some(em),
                    duracao_segundos: duracao,
                    incompleto: false,
                });
                aberta = None;
            }
            (TipoPonto::Saida, None) => turnos.push(turno_incompleto(None, Some(em))),
        }
    }

    if let Some(entrada) = aberta {
        turnos.push(turno_incompleto(Some(entrada), None));
    }

    let total_segundos = turnos.iter().map(|t| t.duracao_segundos).sum();
    let incompleto = turnos.iter().any(|t| t.incompleto);

    Apuracao { turnos, total_segundos, incompleto }
}

fn turno_incompleto(entrada: Option<DateTime<Utc>>, saida: Option<DateTime<Utc>>) -> Turno {
    Turno { entrada, saida, duracao_segundos: 0, incompleto: true }
}

/// "HH:MM" (horas podem passar de 24 em totais de período).
pub fn formatar_duracao(segundos: i64) -> String {
    let segundos = segundos.max(0);
    format!("{:02}:{:02}", segundos / 3600, (segundos % 3600) / 60)
}

/// Agrupa os turnos pelo dia local da primeira batida de cada um.
pub fn resumir_periodo(
    user_id: Uuid,
    de: NaiveDate,
    ate: NaiveDate,
    batidas: &[(TipoPonto, DateTime<Utc>)],
    fuso: FixedOffset,
) -> ResumoPonto {
    let apuracao = apurar_turnos(batidas);

    let mut por_dia: BTreeMap<NaiveDate, Vec<Turno>> = BTreeMap::new();
    for turno in apuracao.turnos {
        let Some(referencia) = turno.entrada.or(turno.saida) else {
            continue;
        };
        let dia = referencia.with_timezone(&fuso).date_naive();
        por_dia.entry(dia).or_default().push(turno);
    }

    let dias: Vec<ResumoDia> = por_dia
        .into_iter()
        .map(|(data, turnos)| {
            let total_segundos: i64 = turnos.iter().map(|t| t.duracao_segundos).sum();
            ResumoDia {
                data,
                incompleto: turnos.iter().any(|t| t.incompleto),
                total_formatado: formatar_duracao(total_segundos),
                total_segundos,
                turnos,
            }
        })
        .collect();

    ResumoPonto {
        user_id,
        de,
        ate,
        dias,
        total_segundos: apuracao.total_segundos,
        total_formatado: formatar_duracao(apuracao.total_segundos),
        incompleto: apuracao.incompleto,
    }
}

/// Sem tipo informado, a batida fecha uma ENTRADA ainda aberta ou abre um turno.
///
/// A ENTRADA conta como aberta por até `JORNADA_MAXIMA_HORAS`, o que cobre
/// turnos que atravessam a meia-noite.
pub fn proximo_tipo(ultima: Option<(TipoPonto, DateTime<Utc>)>, agora: DateTime<Utc>) -> TipoPonto {
    match ultima {
        Some((TipoPonto::Entrada, em)) if agora - em < Duration::hours(JORNADA_MAXIMA_HORAS) => TipoPonto::Saida,
        _ => TipoPonto::Entrada,
    }
}

/// Decide o tipo da batida e barra o clique duplo.
///
/// Com o tipo inferido, qualquer batida dentro da janela é duplicada; com o
/// tipo informado, só a repetição do mesmo tipo.
pub fn validar_batida(
    informado: Option<TipoPonto>,
    ultima: Option<(TipoPonto, DateTime<Utc>)>,
    agora: DateTime<Utc>,
) -> Result<TipoPonto, AppError> {
    let tipo = informado.unwrap_or_else(|| proximo_tipo(ultima, agora));

    if let Some((tipo_anterior, em)) = ultima {
        let na_janela = (agora - em).num_seconds() < JANELA_DUPLICIDADE_SEGUNDOS;
        if na_janela && (informado.is_none() || tipo_anterior == tipo) {
            return Err(AppError::Conflict("Batida duplicada: aguarde um minuto.".into()));
        }
    }

    Ok(tipo)
}

/// Converte um dia local no instante UTC de sua meia-noite.
fn inicio_do_dia(dia: NaiveDate, fuso: FixedOffset) -> DateTime<Utc> {
    let local = dia.and_time(NaiveTime::MIN);
    (local - Duration::seconds(i64::from(fuso.local_minus_utc()))).and_utc()
}

/// Intervalo UTC semiaberto que cobre os dias locais [de, ate].
pub fn intervalo_utc(
    de: NaiveDate,
    ate: NaiveDate,
    fuso: FixedOffset,
) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
    if ate < de {
        return Err(AppError::BadRequest("A data final não pode ser anterior à data inicial.".into()));
    }
    if (ate - de).num_days() >= MAX_PERIODO_DIAS {
        return Err(AppError::BadRequest(format!(
            "O período máximo de consulta é de {} dias.",
            MAX_PERIODO_DIAS
        )));
    }

    let fim = ate
        .succ_opt()
        .ok_or_else(|| AppError::BadRequest("Data final fora do intervalo suportado.".into()))?;

    Ok((inicio_do_dia(de, fuso), inicio_do_dia(fim, fuso)))
}

// =============================================================================
//  SERVIÇO
// =============================================================================

#[derive(Clone)]
pub struct PontoService {
    repo: PontoRepository,
    user_repo: UserRepository,
    fuso: FixedOffset,
}

impl PontoService {
    pub fn new(repo: PontoRepository, user_repo: UserRepository, fuso: FixedOffset) -> Self {
        Self { repo, user_repo, fuso }
    }

    fn hoje(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.fuso).date_naive()
    }

    /// Período padrão: do primeiro dia do mês corrente até hoje.
    pub fn resolver_periodo(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> (NaiveDate, NaiveDate) {
        let hoje = self.hoje();
        let ate = to.unwrap_or(hoje);
        let de = from.unwrap_or_else(|| ate.with_day(1).unwrap_or(ate));
        (de, ate)
    }

    /// Batida do próprio funcionário, no horário do servidor.
    pub async fn registrar(
        &self,
        user_id: Uuid,
        payload: &RegistrarPontoPayload,
    ) -> Result<PontoRegistro, AppError> {
        let agora = Utc::now();
        let ultima = self.repo
            .last_between(user_id, agora - Duration::hours(JORNADA_MAXIMA_HORAS), agora)
            .await?
            .map(|r| (r.tipo, r.registrado_em));

        let tipo = validar_batida(payload.tipo, ultima, agora)?;

        let registro = self.repo
            .create(user_id, tipo, agora, payload.observacao.as_deref(), user_id)
            .await?;

        tracing::info!("⏱️ Ponto {:?} registrado para {}", tipo, user_id);
        Ok(registro)
    }

    pub async fn listar(
        &self,
        user_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<PontoListResponse, AppError> {
        let (de, ate) = self.resolver_periodo(from, to);
        let (inicio, fim) = intervalo_utc(de, ate, self.fuso)?;

        let registros = self.repo.list_between(user_id, inicio, fim).await?;
        let batidas: Vec<(TipoPonto, DateTime<Utc>)> =
            registros.iter().map(|r| (r.tipo, r.registrado_em)).collect();
        let resumo = resumir_periodo(user_id, de, ate, &batidas, self.fuso);

        Ok(PontoListResponse { registros, resumo })
    }

    /// Lançamento manual feito por um gestor.
    pub async fn lancar(&self, actor_id: Uuid, payload: &LancarPontoPayload) -> Result<PontoRegistro, AppError> {
        if self.user_repo.find_by_id(payload.user_id).await?.is_none() {
            return Err(AppError::UserNotFound);
        }

        let registro = self.repo
            .create(
                payload.user_id,
                payload.tipo,
                payload.registrado_em,
                payload.observacao.as_deref(),
                actor_id,
            )
            .await?;

        tracing::info!("✍️ Ponto lançado manualmente por {} para {}", actor_id, payload.user_id);
        Ok(registro)
    }

    pub async fn ajustar(
        &self,
        actor_id: Uuid,
        id: Uuid,
        payload: &AjustarPontoPayload,
    ) -> Result<PontoRegistro, AppError> {
        self.repo
            .update(id, payload.tipo, payload.registrado_em, payload.observacao.as_deref(), actor_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Registro de ponto não encontrado.".into()))
    }

    pub async fn excluir(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("Registro de ponto não encontrado.".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn brt() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    /// Horário local (UTC-3) de um dia de junho/2026.
    fn at(dia: u32, hora: u32, minuto: u32) -> DateTime<Utc> {
        brt()
            .with_ymd_and_hms(2026, 6, dia, hora, minuto, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn entrada(em: DateTime<Utc>) -> (TipoPonto, DateTime<Utc>) {
        (TipoPonto::Entrada, em)
    }

    fn saida(em: DateTime<Utc>) -> (TipoPonto, DateTime<Utc>) {
        (TipoPonto::Saida, em)
    }

    #[test]
    fn two_complete_shifts_total_seven_hours() {
        let batidas = [
            entrada(at(10, 9, 0)),
            saida(at(10, 12, 0)),
            entrada(at(10, 13, 0)),
            saida(at(10, 17, 0)),
        ];

        let apuracao = apurar_turnos(&batidas);

        assert_eq!(apuracao.turnos.len(), 2);
        assert_eq!(apuracao.total_segundos, 7 * 3600);
        assert_eq!(formatar_duracao(apuracao.total_segundos), "07:00");
        assert!(!apuracao.incompleto);
    }

    #[test]
    fn lone_entry_is_flagged() {
        let apuracao = apurar_turnos(&[entrada(at(10, 9, 0))]);

        assert!(apuracao.incompleto);
        assert_eq!(apuracao.total_segundos, 0);
        assert_eq!(
            apuracao.turnos,
            vec![Turno {
                entrada: Some(at(10, 9, 0)),
                saida: None,
                duracao_segundos: 0,
                incompleto: true,
            }]
        );
    }

    #[test]
    fn order_of_input_does_not_matter() {
        let ordenadas = [
            entrada(at(10, 8, 0)),
            saida(at(10, 12, 0)),
            entrada(at(10, 13, 0)),
            saida(at(10, 18, 30)),
        ];
        let embaralhadas = [ordenadas[3], ordenadas[0], ordenadas[2], ordenadas[1]];

        assert_eq!(apurar_turnos(&ordenadas), apurar_turnos(&embaralhadas));
    }

    #[test]
    fn double_entry_keeps_the_later_one_open() {
        let batidas = [
            entrada(at(10, 8, 0)),
            entrada(at(10, 8, 5)),
            saida(at(10, 12, 5)),
        ];

        let apuracao = apurar_turnos(&batidas);

        assert!(apuracao.incompleto);
        assert_eq!(apuracao.turnos.len(), 2);
        assert_eq!(apuracao.turnos[0].saida, None);
        assert_eq!(apuracao.turnos[1].entrada, Some(at(10, 8, 5)));
        assert_eq!(apuracao.total_segundos, 4 * 3600);
    }

    #[test]
    fn exit_without_entry_is_flagged_but_does_not_count() {
        let batidas = [
            saida(at(10, 7, 0)),
            entrada(at(10, 9, 0)),
            saida(at(10, 10, 30)),
        ];

        let apuracao = apurar_turnos(&batidas);

        assert!(apuracao.incompleto);
        assert_eq!(apuracao.turnos[0].entrada, None);
        assert_eq!(apuracao.total_segundos, 90 * 60);
    }

    #[test]
    fn empty_input_is_an_empty_clean_result() {
        let apuracao = apurar_turnos(&[]);
        assert!(apuracao.turnos.is_empty());
        assert_eq!(apuracao.total_segundos, 0);
        assert!(!apuracao.incompleto);
    }

    #[test]
    fn formats_long_totals() {
        assert_eq!(formatar_duracao(0), "00:00");
        assert_eq!(formatar_duracao(59), "00:00");
        assert_eq!(formatar_duracao(151 * 3600 + 30 * 60), "151:30");
        assert_eq!(formatar_duracao(-10), "00:00");
    }

    #[test]
    fn groups_shifts_by_local_day() {
        let user_id = Uuid::new_v4();
        let batidas = [
            entrada(at(10, 9, 0)),
            saida(at(10, 17, 0)),
            // 22h locais já são dia 12 em UTC; conta no dia 11
            entrada(at(11, 22, 0)),
        ];
        let de = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let ate = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();

        let resumo = resumir_periodo(user_id, de, ate, &batidas, brt());

        assert_eq!(resumo.dias.len(), 2);
        assert_eq!(resumo.dias[0].data, NaiveDate::from_ymd_opt(2026, 6, 10).unwrap());
        assert_eq!(resumo.dias[0].total_formatado, "08:00");
        assert!(!resumo.dias[0].incompleto);
        assert_eq!(resumo.dias[1].data, NaiveDate::from_ymd_opt(2026, 6, 11).unwrap());
        assert!(resumo.dias[1].incompleto);
        assert!(resumo.incompleto);
        assert_eq!(resumo.total_formatado, "08:00");
    }

    #[test]
    fn next_punch_alternates() {
        let agora = at(10, 12, 0);
        assert_eq!(proximo_tipo(None, agora), TipoPonto::Entrada);
        assert_eq!(proximo_tipo(Some(entrada(at(10, 8, 0))), agora), TipoPonto::Saida);
        assert_eq!(proximo_tipo(Some(saida(at(10, 11, 0))), agora), TipoPonto::Entrada);
    }

    #[test]
    fn overnight_entry_is_closed_after_midnight() {
        // entrou às 22h do dia 10, sai às 2h do dia 11
        assert_eq!(proximo_tipo(Some(entrada(at(10, 22, 0))), at(11, 2, 0)), TipoPonto::Saida);
        // entrada esquecida de mais de 16h atrás abre um turno novo
        assert_eq!(proximo_tipo(Some(entrada(at(10, 8, 0))), at(11, 9, 0)), TipoPonto::Entrada);
    }

    #[test]
    fn double_click_without_type_is_rejected() {
        let ultima = Some(entrada(at(10, 9, 0)));
        let segundos_depois = at(10, 9, 0) + Duration::seconds(2);

        assert!(matches!(
            validar_batida(None, ultima, segundos_depois),
            Err(AppError::Conflict(_))
        ));
        assert_eq!(validar_batida(None, ultima, at(10, 9, 1)).unwrap(), TipoPonto::Saida);
    }

    #[test]
    fn explicit_type_only_conflicts_with_the_same_type() {
        let ultima = Some(entrada(at(10, 9, 0)));
        let logo_depois = at(10, 9, 0) + Duration::seconds(10);

        assert!(matches!(
            validar_batida(Some(TipoPonto::Entrada), ultima, logo_depois),
            Err(AppError::Conflict(_))
        ));
        assert_eq!(
            validar_batida(Some(TipoPonto::Saida), ultima, logo_depois).unwrap(),
            TipoPonto::Saida
        );
        assert_eq!(validar_batida(None, None, logo_depois).unwrap(), TipoPonto::Entrada);
    }

    #[test]
    fn utc_range_covers_whole_local_days() {
        let dia = NaiveDate::from_ymd_opt(2026, 6, 10).unwrap();
        let (inicio, fim) = intervalo_utc(dia, dia, brt()).unwrap();

        assert_eq!(inicio, Utc.with_ymd_and_hms(2026, 6, 10, 3, 0, 0).unwrap());
        assert_eq!(fim, Utc.with_ymd_and_hms(2026, 6, 11, 3, 0, 0).unwrap());
    }

    #[test]
    fn rejects_inverted_or_huge_ranges() {
        let de = NaiveDate::from_ymd_opt(2026, 6, 10).unwrap();
        let ate = NaiveDate::from_ymd_opt(2026, 6, 9).unwrap();
        assert!(matches!(intervalo_utc(de, ate, brt()), Err(AppError::BadRequest(_))));

        let ate = NaiveDate::from_ymd_opt(2027, 6, 12).unwrap();
        assert!(matches!(intervalo_utc(de, ate, brt()), Err(AppError::BadRequest(_))));
    }
}
